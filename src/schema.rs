use serde::{Deserialize, Serialize};

/// Table definition handed to `CREATE TABLE`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub table_name: String,
    #[serde(rename = "tableFields", alias = "fields")]
    pub fields: Vec<Field>,
}

impl TableSpec {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a column. `data_type` is emitted verbatim, so it may carry
    /// constraints such as `INTEGER PRIMARY KEY AUTOINCREMENT`.
    pub fn with_field(mut self, column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.fields.push(Field {
            column_name: column_name.into(),
            data_type: data_type.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub column_name: String,
    pub data_type: String,
}
