//! Operations described as JSON.
//!
//! Callers that cannot use the typed API (a bridge to a scripting runtime,
//! a message queue) send objects such as
//! `{"op": "deleteItem", "tableName": "people", "condition": {"age": 26}}`.
//! Decoding checks presence and shape of every argument and reports
//! [`HelperError::MissingParameter`] or [`HelperError::TypeMismatch`]
//! before anything reaches the driver.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::driver::Driver;
use crate::error::{HelperError, Result};
use crate::normalize::Outcome;
use crate::schema::{Field, TableSpec};
use crate::session::{ConnectionInfo, SqliteHelper};
use crate::statement::{Columns, SelectConfig};
use crate::value::{Condition, Item, Row, SqlValue};

/// A decoded request
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Open,
    Close,
    CreateTable(TableSpec),
    DropTable {
        table_name: String,
    },
    InsertItems {
        table_name: String,
        items: Vec<Item>,
    },
    DeleteItem {
        table_name: String,
        condition: Option<Condition>,
    },
    UpdateItem {
        table_name: String,
        item: Item,
        condition: Option<Condition>,
    },
    SelectItems {
        table_name: String,
        config: SelectConfig,
    },
}

/// Success value of a dispatched operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Opened(ConnectionInfo),
    Done(Outcome),
    Rows(Vec<Row>),
}

/// `{"res": ...}` on success, `{"err": "<message>"}` on failure.
pub fn to_json(result: &Result<Response>) -> Value {
    match result {
        Ok(response) => json!({ "res": response }),
        Err(err) => json!({ "err": err.to_string() }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Absent and `null` both count as missing.
fn optional<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

fn required<'a>(args: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value> {
    optional(args, key).ok_or(HelperError::MissingParameter(key))
}

fn string(args: &Map<String, Value>, key: &'static str) -> Result<String> {
    let value = required(args, key)?;
    let text = value
        .as_str()
        .ok_or_else(|| HelperError::type_mismatch(key, "string", json_type(value)))?;
    if text.is_empty() {
        return Err(HelperError::MissingParameter(key));
    }
    Ok(text.to_string())
}

fn object<'a>(parameter: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| HelperError::type_mismatch(parameter, "object", json_type(value)))
}

fn array<'a>(parameter: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| HelperError::type_mismatch(parameter, "array", json_type(value)))
}

fn scalar(parameter: &str, value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(HelperError::type_mismatch(parameter, "scalar", json_type(value)))
        }
    })
}

fn item(parameter: &str, value: &Value) -> Result<Item> {
    object(parameter, value)?
        .iter()
        .map(|(column, v)| Ok((column.as_str(), scalar(&format!("{parameter}.{column}"), v)?)))
        .collect::<Result<Vec<_>>>()
        .map(|entries| entries.into_iter().collect())
}

fn condition(args: &Map<String, Value>) -> Result<Option<Condition>> {
    let Some(value) = optional(args, "condition") else {
        return Ok(None);
    };
    let condition = item("condition", value)?;
    Ok((!condition.is_empty()).then_some(condition))
}

fn columns(args: &Map<String, Value>) -> Result<Columns> {
    let Some(value) = optional(args, "columns") else {
        return Ok(Columns::All);
    };
    let mismatch = || HelperError::type_mismatch("columns", "Array or '*'", json_type(value));
    match value {
        Value::String(s) if s == "*" => Ok(Columns::All),
        Value::Array(names) => names
            .iter()
            .map(|name| name.as_str().map(str::to_string).ok_or_else(mismatch))
            .collect::<Result<Vec<_>>>()
            .map(Columns::Named),
        _ => Err(mismatch()),
    }
}

fn page_value(args: &Map<String, Value>, keys: &[&'static str]) -> Result<Option<u32>> {
    for key in keys {
        if let Some(value) = optional(args, key) {
            return value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| HelperError::type_mismatch(*key, "positive integer", json_type(value)));
        }
    }
    Ok(None)
}

fn table_spec(args: &Map<String, Value>) -> Result<TableSpec> {
    let table_name = string(args, "tableName")?;
    let fields = array("tableFields", required(args, "tableFields")?)?
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let field = object(&format!("tableFields[{i}]"), field)?;
            Ok(Field {
                column_name: string(field, "columnName")?,
                data_type: string(field, "dataType")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TableSpec { table_name, fields })
}

impl Operation {
    pub fn from_json(request: &Value) -> Result<Operation> {
        let args = object("request", request)?;
        let op = string(args, "op")?;
        Ok(match op.as_str() {
            "open" => Operation::Open,
            "close" => Operation::Close,
            "createTable" => Operation::CreateTable(table_spec(args)?),
            "dropTable" => Operation::DropTable {
                table_name: string(args, "tableName")?,
            },
            "insertItems" => {
                let table_name = string(args, "tableName")?;
                let items = array("items", required(args, "items")?)?
                    .iter()
                    .enumerate()
                    .map(|(i, v)| item(&format!("items[{i}]"), v))
                    .collect::<Result<Vec<_>>>()?;
                Operation::InsertItems { table_name, items }
            }
            "deleteItem" => Operation::DeleteItem {
                table_name: string(args, "tableName")?,
                condition: condition(args)?,
            },
            "updateItem" => Operation::UpdateItem {
                table_name: string(args, "tableName")?,
                item: item("item", required(args, "item")?)?,
                condition: condition(args)?,
            },
            "selectItems" => Operation::SelectItems {
                table_name: string(args, "tableName")?,
                config: SelectConfig {
                    columns: columns(args)?,
                    condition: condition(args)?,
                    page_number: page_value(args, &["pageNo", "pageNumber"])?,
                    page_length: page_value(args, &["pageLength"])?,
                },
            },
            _ => return Err(HelperError::UnknownOperation(op.clone())),
        })
    }
}

impl<D: Driver> SqliteHelper<D> {
    /// Decode `request` and run it.
    pub async fn dispatch(&self, request: &Value) -> Result<Response> {
        let operation = Operation::from_json(request)?;
        self.run(operation).await
    }

    pub async fn run(&self, operation: Operation) -> Result<Response> {
        Ok(match operation {
            Operation::Open => Response::Opened(self.open().await?),
            Operation::Close => Response::Done(self.close().await?),
            Operation::CreateTable(spec) => Response::Done(self.create_table(&spec).await?),
            Operation::DropTable { table_name } => Response::Done(self.drop_table(&table_name).await?),
            Operation::InsertItems { table_name, items } => {
                Response::Done(self.insert_items(&table_name, &items).await?)
            }
            Operation::DeleteItem {
                table_name,
                condition,
            } => Response::Done(self.delete_item(&table_name, condition.as_ref()).await?),
            Operation::UpdateItem {
                table_name,
                item,
                condition,
            } => Response::Done(
                self.update_item(&table_name, &item, condition.as_ref())
                    .await?,
            ),
            Operation::SelectItems { table_name, config } => {
                Response::Rows(self.select_items(&table_name, &config).await?)
            }
        })
    }
}
