use serde::{Deserialize, Serialize};

use crate::format::to_fixed;
use crate::layout::Block;

/// What a block's value label shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LabelMode {
    #[default]
    Value,
    ValuePercentage,
    /// Any mode this renderer does not know; labels come out empty.
    Unknown,
}

impl LabelMode {
    pub fn from_token(token: &str) -> Self {
        match token {
            "value" => Self::Value,
            "value_percentage" => Self::ValuePercentage,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::ValuePercentage => "value_percentage",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for LabelMode {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<LabelMode> for String {
    fn from(mode: LabelMode) -> Self {
        mode.as_str().to_string()
    }
}

pub fn format_label(block: &Block, mode: LabelMode) -> String {
    match mode {
        LabelMode::Value => block.rendered.clone(),
        LabelMode::ValuePercentage => match block.percent {
            Some(percent) => format!("{} ({}%)", block.rendered, to_fixed(percent * 100.0, 2)),
            None => block.rendered.clone(),
        },
        LabelMode::Unknown => String::new(),
    }
}

/// Two-line tooltip markup: a bold title line and a value line.
pub fn format_tooltip(title: &str, body: &str) -> String {
    format!(
        "<div class=\"title\">{}</div><div>{}</div>",
        escape_xml(title),
        escape_xml(body)
    )
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
