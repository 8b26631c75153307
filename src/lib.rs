#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod format;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod query;
pub mod render;
pub mod scale;
pub mod theme;

pub use color::{ColorOverride, ColorResolver, load_color_overrides};
pub use config::{ChartConfig, Config, RenderConfig, load_config};
pub use format::humanize;
pub use label::{LabelMode, format_label, format_tooltip};
pub use layout::{Block, BlockKind, Domain, LayoutError, LayoutMode, WaterfallLayout, compute_layout};
pub use layout_dump::LayoutDump;
pub use query::{Cell, CellValue, Field, Fields, QueryResponse, Row, parse_query_response};
pub use render::render_svg;
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;

/// Everything a host passes alongside the query result.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    pub overrides: Vec<ColorOverride>,
}

impl RenderOptions {
    pub fn looker() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        let mut options = Self::default();
        options.config.theme = Theme::modern();
        options.config.render.background = options.config.theme.background.clone();
        options
    }
}

/// Lays out and renders one query result.
pub fn render_query(
    query: &QueryResponse,
    config: &Config,
    overrides: &[ColorOverride],
) -> Result<String, LayoutError> {
    let layout = compute_layout(&query.data, &query.fields, config, overrides)?;
    Ok(render_svg(&layout, config))
}

/// Parses a JSON query result and renders it to SVG.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let query = parse_query_response(input)?;
    Ok(render_query(&query, &options.config, &options.overrides)?)
}

/// Parses a JSON query result and returns the block layout as JSON.
pub fn layout_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let query = parse_query_response(input)?;
    let layout = compute_layout(&query.data, &query.fields, &options.config, &options.overrides)?;
    let dump = LayoutDump::from_layout(&layout, options.config.chart.label_type);
    Ok(serde_json::to_string(&dump)?)
}
