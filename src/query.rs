use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata for one dimension or measure column of a query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_short: Option<String>,
    #[serde(default)]
    pub field_group_variant: Option<String>,
}

impl Field {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_label_short(mut self, label_short: &str) -> Self {
        self.label_short = Some(label_short.to_string());
        self
    }

    pub fn with_group_variant(mut self, variant: &str) -> Self {
        self.field_group_variant = Some(variant.to_string());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn short_label(&self) -> Option<&str> {
        self.label_short.as_deref().or(self.label.as_deref())
    }

    /// Name used for baseline blocks and tooltips.
    pub fn group_label(&self) -> &str {
        self.field_group_variant
            .as_deref()
            .unwrap_or_else(|| self.display_label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default)]
    pub dimension_like: Vec<Field>,
    #[serde(default)]
    pub measure_like: Vec<Field>,
    #[serde(default)]
    pub pivots: Vec<Field>,
}

/// Raw value of a cell. Dimensions usually carry text, measures numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// One cell of a row. A host-supplied `rendered` string takes precedence over
/// any locally computed formatting of `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            rendered: None,
        }
    }

    pub fn rendered(value: impl Into<CellValue>, rendered: &str) -> Self {
        Self {
            value: value.into(),
            rendered: Some(rendered.to_string()),
        }
    }
}

pub type Row = BTreeMap<String, Cell>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub fields: Fields,
    #[serde(default)]
    pub data: Vec<Row>,
}

pub fn parse_query_response(input: &str) -> serde_json::Result<QueryResponse> {
    serde_json::from_str(input)
}
