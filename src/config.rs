use crate::color::default_palette;
use crate::label::LabelMode;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options a user picks for one chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub color_range: Vec<String>,
    pub value_labels: bool,
    pub label_type: LabelMode,
    pub show_gridlines: bool,
    pub show_lines_between_blocks: bool,
    /// Sum the baseline measure across rows instead of taking the first row.
    pub sum_for_baseline: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            color_range: default_palette(),
            value_labels: true,
            label_type: LabelMode::Value,
            show_gridlines: true,
            show_lines_between_blocks: true,
            sum_for_baseline: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 30.0,
            bottom: 20.0,
            left: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub margin: Margin,
    /// Fraction of each band left empty around a bar.
    pub band_padding: f32,
    pub y_ticks: usize,
    pub grid_ticks: usize,
    /// Vertical room reserved for rotated category labels.
    pub x_label_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            margin: Margin::default(),
            band_padding: 0.3,
            y_ticks: 5,
            grid_ticks: 6,
            x_label_height: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::looker();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            chart: ChartConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ChartConfigFile {
    #[serde(alias = "colorRange")]
    color_range: Option<Vec<String>>,
    #[serde(alias = "valueLabels")]
    value_labels: Option<bool>,
    #[serde(alias = "labelType")]
    label_type: Option<LabelMode>,
    #[serde(alias = "showGridlines")]
    show_gridlines: Option<bool>,
    #[serde(alias = "showLinesBetweenBlocks")]
    show_lines_between_blocks: Option<bool>,
    #[serde(alias = "sumForBaseline")]
    sum_for_baseline: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    label_color: Option<String>,
    axis_color: Option<String>,
    grid_color: Option<String>,
    connector_color: Option<String>,
    background: Option<String>,
    baseline_color: Option<String>,
    total_color: Option<String>,
    standalone_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    band_padding: Option<f32>,
    y_ticks: Option<usize>,
    grid_ticks: Option<usize>,
    x_label_height: Option<f32>,
    margin: Option<Margin>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    #[serde(alias = "options")]
    chart: Option<ChartConfigFile>,
    render: Option<RenderConfigFile>,
}

/// Reads a JSON or JSON5 config file; every key is optional.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "looker" {
            config.theme = Theme::looker();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.axis_color {
            config.theme.axis_color = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = vars.connector_color {
            config.theme.connector_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.baseline_color {
            config.theme.baseline_color = v;
        }
        if let Some(v) = vars.total_color {
            config.theme.total_color = v;
        }
        if let Some(v) = vars.standalone_color {
            config.theme.standalone_color = v;
        }
    }

    if let Some(chart) = parsed.chart {
        if let Some(v) = chart.color_range {
            // An empty range means "use the built-in palette".
            config.chart.color_range = if v.is_empty() { default_palette() } else { v };
        }
        if let Some(v) = chart.value_labels {
            config.chart.value_labels = v;
        }
        if let Some(v) = chart.label_type {
            config.chart.label_type = v;
        }
        if let Some(v) = chart.show_gridlines {
            config.chart.show_gridlines = v;
        }
        if let Some(v) = chart.show_lines_between_blocks {
            config.chart.show_lines_between_blocks = v;
        }
        if let Some(v) = chart.sum_for_baseline {
            config.chart.sum_for_baseline = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.band_padding {
            config.render.band_padding = v.clamp(0.0, 0.95);
        }
        if let Some(v) = render.y_ticks {
            config.render.y_ticks = v.max(1);
        }
        if let Some(v) = render.grid_ticks {
            config.render.grid_ticks = v.max(1);
        }
        if let Some(v) = render.x_label_height {
            config.render.x_label_height = v.max(0.0);
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
    }

    Ok(config)
}
