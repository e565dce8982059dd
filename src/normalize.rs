//! Mapping of raw driver responses onto the helper's result contract.

use serde::Serialize;

use crate::driver::ResultSet;
use crate::error::{HelperError, Result};
use crate::value::Row;

pub const CREATE_DONE: &str = "CREATE TABLE SQL done";
pub const DROP_DONE: &str = "DROP TABLE SQL done";
pub const INSERT_DONE: &str = "All INSERT SQL done";
pub const DELETE_DONE: &str = "DELETE SQL done";
pub const UPDATE_DONE: &str = "UPDATE SQL done";
pub const DATABASE_CLOSED: &str = "Database CLOSED";
pub const NOT_OPENED: &str = "Database was not OPENED";

pub fn database_deleted(name: &str) -> String {
    format!("Database {name} DELETED")
}

/// Success payload of mutations and lifecycle calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Whatever the driver returned.
    Results(Vec<ResultSet>),
    /// Placeholder or acknowledgement text when the driver returned no sets.
    Message(String),
}

impl Outcome {
    /// Total rows touched, zero for a message.
    pub fn rows_affected(&self) -> u64 {
        match self {
            Outcome::Results(sets) => sets.iter().map(|s| s.rows_affected).sum(),
            Outcome::Message(_) => 0,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Message(text) => Some(text),
            Outcome::Results(_) => None,
        }
    }
}

#[derive(Serialize)]
struct OutcomeSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(rename = "rowsAffected")]
    rows_affected: u64,
    #[serde(rename = "insertId", skip_serializing_if = "Option::is_none")]
    insert_id: Option<i64>,
}

impl Serialize for Outcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        OutcomeSummary {
            message: self.message(),
            rows_affected: self.rows_affected(),
            insert_id: match self {
                Outcome::Results(sets) => sets.iter().rev().find_map(|s| s.insert_id),
                Outcome::Message(_) => None,
            },
        }
        .serialize(serializer)
    }
}

/// Driver errors become [`HelperError::Driver`] with their message intact.
pub fn settle<T>(raw: anyhow::Result<T>) -> Result<T> {
    raw.map_err(HelperError::Driver)
}

/// Rows of the first result set, in driver order.
pub fn rows(response: Vec<ResultSet>) -> Result<Vec<Row>> {
    let first = response.into_iter().next().ok_or(HelperError::EmptyResponse)?;
    Ok((0..first.rows.length())
        .filter_map(|i| first.rows.item(i).cloned())
        .collect())
}

pub fn outcome(response: Vec<ResultSet>, placeholder: &str) -> Outcome {
    if response.is_empty() {
        Outcome::Message(placeholder.to_string())
    } else {
        Outcome::Results(response)
    }
}

pub fn message(ack: Option<String>, placeholder: &str) -> Outcome {
    Outcome::Message(
        ack.filter(|text| !text.is_empty())
            .unwrap_or_else(|| placeholder.to_string()),
    )
}
