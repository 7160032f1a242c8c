use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Header substring used by spreadsheet exports for columns without a name.
pub const PLACEHOLDER_COLUMN_MARKER: &str = "Unnamed";

/// Scalar value of one cell.
///
/// Notes:
/// - Empty cells are `Null`, never an empty `Text`, when produced by the CSV loader.
/// - Rows built by hand may still carry blank `Text`; consumers check `is_present`.
/// - Loader-typed numbers display and serialize exactly as their source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Classify a raw cell the way a spreadsheet reader would.
    ///
    /// A number is only typed when its canonical rendering is the trimmed
    /// source text; `007`, `2.50` or a 20-digit id stay `Text`.
    pub fn from_raw(raw: &str) -> Self {
        let t = raw.trim();
        if t.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = t.parse::<i64>() {
            if i.to_string() == t {
                return CellValue::Int(i);
            }
        }
        if let Ok(f) = t.parse::<f64>() {
            if f.is_finite() && format_float(f) == t {
                return CellValue::Float(f);
            }
        }
        CellValue::Text(t.to_string())
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Non-null and, for text, not blank.
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            CellValue::Int(_) | CellValue::Float(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Int(i) => Value::from(*i),
            CellValue::Float(f) => Value::from(*f),
            CellValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => f.write_str(&format_float(*v)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One tabular record: columns in source order.
///
/// Column sets may differ between rows of the same dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CellValue)>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.cells.iter().any(|(k, _)| k == column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ordered JSON object with every column, nulls included.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (k, v) in self.cells.iter() {
            out.insert(k.clone(), v.to_json());
        }
        out
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in self.cells.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Same rendering `serde_json` uses, so corpus text and persisted rows agree.
fn format_float(v: f64) -> String {
    Value::from(v).to_string()
}

/// Empty headers and spreadsheet `Unnamed: N` headers carry no meaning.
pub fn is_placeholder_column(name: &str) -> bool {
    let t = name.trim();
    t.is_empty() || t.contains(PLACEHOLDER_COLUMN_MARKER)
}
