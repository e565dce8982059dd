//! SQL text generation.
//!
//! Operations are first described as a [`Statement`], a small tree of
//! clauses holding typed values, and then rendered. Value quoting happens in
//! one place ([`QuotePolicy::literal`]) for every statement kind.
//!
//! The spacing of the rendered text is part of the contract: callers compare
//! generated statements byte for byte, so every list element is padded with
//! one space on each side and joined by its separator.

use crate::error::{HelperError, Result};
use crate::schema::{Field, TableSpec};
use crate::value::{Condition, Item, SqlValue};

/// How text values are turned into SQL literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuotePolicy {
    /// Wrap in single quotes as is. Embedded quotes break the statement.
    #[default]
    Raw,
    /// Wrap in single quotes and double any embedded single quote.
    Escaped,
}

impl QuotePolicy {
    pub fn literal(self, value: &SqlValue) -> String {
        if value.is_numeric() {
            return value.to_string();
        }
        if let SqlValue::Blob(bytes) = value {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            return format!("X'{hex}'");
        }
        match self {
            QuotePolicy::Raw => format!("'{value}'"),
            QuotePolicy::Escaped => format!("'{}'", value.to_string().replace('\'', "''")),
        }
    }
}

/// Projection of a SELECT
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Columns {
    #[default]
    All,
    Named(Vec<String>),
}

impl<S: Into<String>> FromIterator<S> for Columns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Columns::Named(iter.into_iter().map(Into::into).collect())
    }
}

/// Options for [`StatementBuilder::select`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectConfig {
    pub columns: Columns,
    pub condition: Option<Condition>,
    pub page_number: Option<u32>,
    pub page_length: Option<u32>,
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_page(mut self, page_number: u32, page_length: u32) -> Self {
        self.page_number = Some(page_number);
        self.page_length = Some(page_length);
        self
    }
}

/// `limit`/`offset` pair of a paged SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Both values must be present and non-zero. The limit covers every page
    /// up to and including `page_number`, not just one page.
    pub fn new(page_number: Option<u32>, page_length: Option<u32>) -> Option<Page> {
        let number = u64::from(page_number.filter(|n| *n > 0)?);
        let length = u64::from(page_length.filter(|l| *l > 0)?);
        Some(Page {
            limit: number * length,
            offset: length * (number - 1),
        })
    }
}

/// A statement ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    CreateTable {
        table: &'a str,
        fields: &'a [Field],
    },
    DropTable {
        table: &'a str,
    },
    Insert {
        table: &'a str,
        row: &'a Item,
    },
    Delete {
        table: &'a str,
        filter: Option<&'a Condition>,
    },
    Update {
        table: &'a str,
        assignments: &'a Item,
        filter: Option<&'a Condition>,
    },
    Select {
        table: &'a str,
        columns: &'a Columns,
        filter: Option<&'a Condition>,
        page: Option<Page>,
    },
}

impl Statement<'_> {
    pub fn render(&self, quote: QuotePolicy) -> String {
        let mut sql = String::new();
        match self {
            Statement::CreateTable { table, fields } => {
                sql.push_str(&format!("CREATE TABLE IF NOT EXISTS {table}("));
                sql.push_str(&padded(
                    fields
                        .iter()
                        .map(|f| format!("{} {}", f.column_name, f.data_type)),
                    ",",
                ));
                sql.push_str(");");
            }
            Statement::DropTable { table } => {
                sql.push_str(&format!("DROP TABLE {table};"));
            }
            Statement::Insert { table, row } if row.is_empty() => {
                sql.push_str(&format!("INSERT INTO {table} DEFAULT VALUES;"));
            }
            Statement::Insert { table, row } => {
                sql.push_str(&format!("INSERT INTO {table} ("));
                sql.push_str(&padded(row.columns().map(str::to_string), ","));
                sql.push_str(") VALUES (");
                sql.push_str(&padded(row.values().map(|v| quote.literal(v)), ","));
                sql.push_str(");");
            }
            Statement::Delete { table, filter } => {
                sql.push_str(&format!("DELETE FROM {table}"));
                push_filter(&mut sql, *filter, quote);
                sql.push(';');
            }
            Statement::Update {
                table,
                assignments,
                filter,
            } => {
                sql.push_str(&format!("UPDATE {table} SET"));
                sql.push_str(&padded(equalities(assignments, quote), ","));
                push_filter(&mut sql, *filter, quote);
                sql.push(';');
            }
            Statement::Select {
                table,
                columns,
                filter,
                page,
            } => {
                sql.push_str("SELECT");
                match columns {
                    Columns::Named(names) if !names.is_empty() => {
                        sql.push_str(&padded(names.iter().cloned(), ","));
                    }
                    _ => sql.push_str(" *"),
                }
                sql.push_str(&format!(" FROM {table}"));
                push_filter(&mut sql, *filter, quote);
                match page {
                    Some(Page { limit, offset }) => {
                        sql.push_str(&format!(" limit {limit} offset {offset};"))
                    }
                    None => sql.push(';'),
                }
            }
        }
        sql
    }
}

fn padded(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts
        .map(|part| format!(" {part} "))
        .collect::<Vec<_>>()
        .join(separator)
}

fn equalities<'a>(item: &'a Item, quote: QuotePolicy) -> impl Iterator<Item = String> + 'a {
    item.iter()
        .map(move |(column, value)| format!("{column}={}", quote.literal(value)))
}

fn push_filter(sql: &mut String, filter: Option<&Condition>, quote: QuotePolicy) {
    if let Some(condition) = filter.filter(|c| !c.is_empty()) {
        sql.push_str(" WHERE");
        sql.push_str(&padded(equalities(condition, quote), "AND"));
    }
}

fn require_table(table: &str) -> Result<&str> {
    if table.is_empty() {
        return Err(HelperError::MissingParameter("tableName"));
    }
    Ok(table)
}

/// Turns operation descriptions into SQL text. Performs no I/O.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementBuilder {
    quote: QuotePolicy,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote_policy(quote: QuotePolicy) -> Self {
        Self { quote }
    }

    pub fn quote_policy(&self) -> QuotePolicy {
        self.quote
    }

    pub fn create_table(&self, spec: &TableSpec) -> Result<String> {
        let table = require_table(&spec.table_name)?;
        Ok(Statement::CreateTable {
            table,
            fields: &spec.fields,
        }
        .render(self.quote))
    }

    pub fn drop_table(&self, table: &str) -> Result<String> {
        let table = require_table(table)?;
        Ok(Statement::DropTable { table }.render(self.quote))
    }

    /// One INSERT per item, in item order.
    pub fn insert_batch(&self, table: &str, items: &[Item]) -> Result<Vec<String>> {
        let table = require_table(table)?;
        Ok(items
            .iter()
            .map(|row| Statement::Insert { table, row }.render(self.quote))
            .collect())
    }

    pub fn delete(&self, table: &str, condition: Option<&Condition>) -> Result<String> {
        let table = require_table(table)?;
        Ok(Statement::Delete {
            table,
            filter: condition,
        }
        .render(self.quote))
    }

    pub fn update(&self, table: &str, item: &Item, condition: Option<&Condition>) -> Result<String> {
        let table = require_table(table)?;
        Ok(Statement::Update {
            table,
            assignments: item,
            filter: condition,
        }
        .render(self.quote))
    }

    pub fn select(&self, table: &str, config: &SelectConfig) -> Result<String> {
        let table = require_table(table)?;
        Ok(Statement::Select {
            table,
            columns: &config.columns,
            filter: config.condition.as_ref(),
            page: Page::new(config.page_number, config.page_length),
        }
        .render(self.quote))
    }
}
