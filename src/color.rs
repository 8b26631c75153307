//! Block color resolution: a static override table first, an ordinal palette second.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#dd3333", "#80ce5d", "#f78131", "#369dc1", "#c572d3", "#36c1b3", "#b57052", "#ed69af",
];

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|(rgb|rgba|hsl|hsla)\([^()]*\)|[a-zA-Z]+)$",
    )
    .unwrap()
});
static CSV_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|,)\s*(?:"((?:[^"]|"")*)"|([^,]*))"#).unwrap());

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|color| color.to_string()).collect()
}

pub fn is_valid_color(color: &str) -> bool {
    COLOR_RE.is_match(color.trim())
}

/// A fixed color for one value of a dimension. `dimension_name` matches any
/// dimension whose fully qualified name ends with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOverride {
    #[serde(alias = "dimensionName")]
    pub dimension_name: String,
    #[serde(alias = "dimensionValue")]
    pub dimension_value: String,
    #[serde(alias = "colorCode")]
    pub color_code: String,
}

impl ColorOverride {
    pub fn new(dimension_name: &str, dimension_value: &str, color_code: &str) -> Self {
        Self {
            dimension_name: dimension_name.to_string(),
            dimension_value: dimension_value.to_string(),
            color_code: color_code.to_string(),
        }
    }

    fn matches(&self, dimension_name: &str, value: &str) -> bool {
        dimension_name.ends_with(&self.dimension_name) && self.dimension_value == value
    }
}

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("failed to read color overrides {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid color override JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("color override table is missing the `{0}` column")]
    MissingColumn(&'static str),
    #[error("line {line}: expected {expected} columns, found {found}")]
    MalformedLine {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: unexpected text at column {column}")]
    StrayText { line: usize, column: usize },
    #[error("line {line}: `{color}` is not a color")]
    InvalidColor { line: usize, color: String },
}

/// Loads the override table from a `.json` file or a CSV file with a
/// `dimensionName,dimensionValue,colorCode` header.
pub fn load_color_overrides(path: &Path) -> Result<Vec<ColorOverride>, OverrideError> {
    let contents = std::fs::read_to_string(path).map_err(|source| OverrideError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let overrides = if is_json {
        parse_overrides_json(&contents)?
    } else {
        parse_overrides_csv(&contents)?
    };
    tracing::debug!(count = overrides.len(), path = %path.display(), "loaded color overrides");
    Ok(overrides)
}

pub fn parse_overrides_json(input: &str) -> Result<Vec<ColorOverride>, OverrideError> {
    let overrides: Vec<ColorOverride> = serde_json::from_str(input)?;
    for (idx, entry) in overrides.iter().enumerate() {
        if !is_valid_color(&entry.color_code) {
            return Err(OverrideError::InvalidColor {
                line: idx + 1,
                color: entry.color_code.clone(),
            });
        }
    }
    Ok(overrides)
}

pub fn parse_overrides_csv(input: &str) -> Result<Vec<ColorOverride>, OverrideError> {
    let mut lines = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((header_idx, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let header = split_csv_line(header, header_idx + 1)?;
    let column = |name: &'static str| {
        header
            .iter()
            .position(|col| col.eq_ignore_ascii_case(name))
            .ok_or(OverrideError::MissingColumn(name))
    };
    let name_col = column("dimensionName")?;
    let value_col = column("dimensionValue")?;
    let color_col = column("colorCode")?;

    let mut overrides = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields = split_csv_line(line, line_no)?;
        if fields.len() != header.len() {
            return Err(OverrideError::MalformedLine {
                line: line_no,
                expected: header.len(),
                found: fields.len(),
            });
        }
        let color = fields[color_col].clone();
        if !is_valid_color(&color) {
            return Err(OverrideError::InvalidColor { line: line_no, color });
        }
        overrides.push(ColorOverride {
            dimension_name: fields[name_col].clone(),
            dimension_value: fields[value_col].clone(),
            color_code: color,
        });
    }
    Ok(overrides)
}

/// Splits one CSV record. Every byte must belong to a field, so text after a
/// closing quote is an error rather than dropped.
fn split_csv_line(line: &str, line_no: usize) -> Result<Vec<String>, OverrideError> {
    let line = line.trim_end_matches('\r');
    let mut fields = Vec::new();
    let mut pos = 0;
    for caps in CSV_FIELD_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() != pos {
            return Err(OverrideError::StrayText {
                line: line_no,
                column: pos + 1,
            });
        }
        pos = whole.end();
        fields.push(match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str().replace("\"\"", "\""),
            (None, Some(plain)) => plain.as_str().trim().to_string(),
            _ => String::new(),
        });
    }
    if pos != line.len() {
        return Err(OverrideError::StrayText {
            line: line_no,
            column: pos + 1,
        });
    }
    Ok(fields)
}

/// Assigns palette entries to keys in first-seen order, cycling through the
/// palette once it is exhausted.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    range: Vec<String>,
    index: HashMap<String, usize>,
}

impl OrdinalScale {
    pub fn new(range: &[String]) -> Self {
        let range = if range.is_empty() {
            default_palette()
        } else {
            range.to_vec()
        };
        Self {
            range,
            index: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> &str {
        let next = self.index.len();
        let slot = *self.index.entry(key.to_string()).or_insert(next);
        &self.range[slot % self.range.len()]
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Resolves block colors for one layout call.
#[derive(Debug, Clone)]
pub struct ColorResolver<'a> {
    overrides: &'a [ColorOverride],
    scale: OrdinalScale,
}

impl<'a> ColorResolver<'a> {
    pub fn new(overrides: &'a [ColorOverride], palette: &[String]) -> Self {
        Self {
            overrides,
            scale: OrdinalScale::new(palette),
        }
    }

    pub fn resolve(&mut self, dimension_name: &str, value: &str) -> String {
        if let Some(color) = find_override(self.overrides, dimension_name, value) {
            return color.to_string();
        }
        self.scale.get(&format!("{dimension_name}.{value}")).to_string()
    }
}

/// Looks up a fixed color; blank names or values never match.
pub fn find_override<'a>(
    overrides: &'a [ColorOverride],
    dimension_name: &str,
    value: &str,
) -> Option<&'a str> {
    if dimension_name.is_empty() || value.is_empty() {
        return None;
    }
    overrides
        .iter()
        .find(|entry| entry.matches(dimension_name, value))
        .map(|entry| entry.color_code.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn override_matches_name_suffix_and_exact_value() {
        let overrides = vec![ColorOverride::new("channel", "Web", "#123456")];
        let mut resolver = ColorResolver::new(&overrides, &[]);
        assert_eq!(resolver.resolve("orders.channel", "Web"), "#123456");
        assert_ne!(resolver.resolve("orders.channel", "web"), "#123456");
        assert_ne!(resolver.resolve("orders.channel_group", "Web"), "#123456");
    }

    #[test]
    fn blank_value_skips_overrides() {
        let overrides = vec![ColorOverride::new("channel", "", "#123456")];
        let mut resolver = ColorResolver::new(&overrides, &palette(&["#000"]));
        assert_eq!(resolver.resolve("orders.channel", ""), "#000");
    }

    #[test]
    fn ordinal_fallback_is_stable_and_cycles() {
        let colors = palette(&["#a", "#b"]);
        let mut resolver = ColorResolver::new(&[], &colors);
        assert_eq!(resolver.resolve("d", "x"), "#a");
        assert_eq!(resolver.resolve("d", "y"), "#b");
        assert_eq!(resolver.resolve("d", "z"), "#a");
        assert_eq!(resolver.resolve("d", "y"), "#b");
        assert_eq!(resolver.resolve("d", "x"), "#a");
    }

    #[test]
    fn empty_palette_uses_default() {
        let mut scale = OrdinalScale::new(&[]);
        assert_eq!(scale.get("first"), DEFAULT_PALETTE[0]);
        assert_eq!(scale.get("second"), DEFAULT_PALETTE[1]);
        assert_eq!(scale.len(), 2);
    }

    #[test]
    fn parses_csv_table() {
        let input = "dimensionName,dimensionValue,colorCode\n\
                     channel,Web,#ff0000\n\
                     \"region\",\"North, East\",steelblue\n";
        let overrides = parse_overrides_csv(input).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[1].dimension_value, "North, East");
        assert_eq!(overrides[1].color_code, "steelblue");
    }

    #[test]
    fn csv_rejects_bad_colors_and_columns() {
        let err = parse_overrides_csv("dimensionName,dimensionValue,colorCode\na,b,#zzz\n")
            .unwrap_err();
        assert!(matches!(err, OverrideError::InvalidColor { line: 2, .. }));

        let err = parse_overrides_csv("name,value,color\n").unwrap_err();
        assert!(matches!(err, OverrideError::MissingColumn("dimensionName")));

        let err = parse_overrides_csv("dimensionName,dimensionValue,colorCode\na,b\n").unwrap_err();
        assert!(matches!(err, OverrideError::MalformedLine { line: 2, expected: 3, found: 2 }));
    }

    #[test]
    fn csv_rejects_text_after_closing_quote() {
        let input = "dimensionName,dimensionValue,colorCode\n\
                     region,\"North\" x,#ff0000\n";
        let err = parse_overrides_csv(input).unwrap_err();
        assert!(matches!(err, OverrideError::StrayText { line: 2, column: 15 }));

        let err = parse_overrides_csv("dimensionName,dimensionValue,colorCode\n\"a\"b,c,#fff\n")
            .unwrap_err();
        assert!(matches!(err, OverrideError::StrayText { line: 2, column: 4 }));
    }

    #[test]
    fn read_failure_names_the_file() {
        let path = Path::new("/nonexistent/waterfall-colors.csv");
        let err = load_color_overrides(path).unwrap_err();
        assert!(matches!(err, OverrideError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/waterfall-colors.csv"));
    }

    #[test]
    fn parses_json_table_with_camel_case_keys() {
        let input = r##"[{"dimensionName": "channel", "dimensionValue": "Web", "colorCode": "#00ff00"}]"##;
        let overrides = parse_overrides_json(input).unwrap();
        assert_eq!(overrides[0], ColorOverride::new("channel", "Web", "#00ff00"));
    }

    #[test]
    fn validates_color_syntax() {
        assert!(is_valid_color("#abc"));
        assert!(is_valid_color("#A1B2C3"));
        assert!(is_valid_color("rgba(0, 0, 0, 0.5)"));
        assert!(is_valid_color("steelblue"));
        assert!(!is_valid_color("#abcde"));
        assert!(!is_valid_color("not a color"));
    }
}
