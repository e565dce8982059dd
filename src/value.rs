use serde::{ser::SerializeMap, Serialize, Serializer};
use std::{fmt, ops::Index};

/// Core value types carried in items, conditions and result rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl SqlValue {
    /// Finite numbers are the only values emitted unquoted.
    pub fn is_numeric(&self) -> bool {
        match self {
            SqlValue::Integer(_) => true,
            SqlValue::Real(r) => r.is_finite(),
            _ => false,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("null"),
            SqlValue::Integer(i) => write!(f, "{i}"),
            SqlValue::Real(r) if r.is_nan() => f.write_str("NaN"),
            SqlValue::Real(r) if r.is_infinite() => {
                f.write_str(if *r > 0.0 { "Infinity" } else { "-Infinity" })
            }
            SqlValue::Real(r) => write!(f, "{r}"),
            SqlValue::Text(s) => f.write_str(s),
            // lossy; SQL literals use the hex form instead
            SqlValue::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
            SqlValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Column name to value mapping that remembers insertion order.
///
/// Used as the row of an INSERT, the SET clause of an UPDATE and, as
/// [`Condition`], an equality filter. The order columns were added in is
/// the order they are rendered in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Item {
    entries: Vec<(String, SqlValue)>,
}

impl Item {
    /// Create an empty item
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn with_value(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` to `value`. An existing column keeps its position.
    pub fn insert(&mut self, name: &str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Index<&str> for Item {
    type Output = SqlValue;

    fn index(&self, name: &str) -> &SqlValue {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no column named {name}"),
        }
    }
}

impl<K: Into<String>, V: Into<SqlValue>, const N: usize> From<[(K, V); N]> for Item {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Serializes as a map in column order.
impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut item = Item::new();
        for (k, v) in iter {
            item.insert(&k.into(), v);
        }
        item
    }
}

/// Equality filter: every column must equal its value.
pub type Condition = Item;

/// One result row, columns in the order the driver reported them.
pub type Row = Item;
