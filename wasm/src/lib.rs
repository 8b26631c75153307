use waterfall_rs::{
    ColorOverride, LabelMode, RenderOptions, layout_with_options, render_with_options,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaterfallRenderOptions {
    theme: Option<String>,
    color_range: Option<Vec<String>>,
    value_labels: Option<bool>,
    label_type: Option<LabelMode>,
    show_gridlines: Option<bool>,
    show_lines_between_blocks: Option<bool>,
    sum_for_baseline: Option<bool>,
    width: Option<f32>,
    height: Option<f32>,
    #[serde(default)]
    color_overrides: Vec<ColorOverride>,
}

fn build_render_options(options: WaterfallRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::looker()
    };
    let config = &mut render_options.config;

    if let Some(colors) = options.color_range.filter(|colors| !colors.is_empty()) {
        config.chart.color_range = colors;
    }
    if let Some(value_labels) = options.value_labels {
        config.chart.value_labels = value_labels;
    }
    if let Some(label_type) = options.label_type {
        config.chart.label_type = label_type;
    }
    if let Some(show_gridlines) = options.show_gridlines {
        config.chart.show_gridlines = show_gridlines;
    }
    if let Some(show_lines) = options.show_lines_between_blocks {
        config.chart.show_lines_between_blocks = show_lines;
    }
    if let Some(sum_for_baseline) = options.sum_for_baseline {
        config.chart.sum_for_baseline = sum_for_baseline;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    render_options.overrides = options.color_overrides;

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<WaterfallRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        WaterfallRenderOptions::default()
    };
    Ok(build_render_options(options))
}

#[wasm_bindgen]
pub fn render_waterfall_svg(query_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    render_with_options(query_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn layout_waterfall_json(query_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    layout_with_options(query_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
