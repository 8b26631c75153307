use crate::config::{Config, RenderConfig};
use crate::format::format_axis_tick;
use crate::label::{escape_xml, format_label};
use crate::layout::{Block, BlockKind, WaterfallLayout};
use crate::scale::{BandScale, LinearScale};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Pixel frame of the plot area inside the margins.
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(render: &RenderConfig) -> Self {
        let margin = &render.margin;
        let width = f64::from(render.width - margin.left - margin.right).max(1.0);
        let height =
            f64::from(render.height - margin.top - margin.bottom - render.x_label_height).max(1.0);
        Self {
            left: f64::from(margin.left),
            top: f64::from(margin.top),
            width,
            height,
        }
    }
}

pub fn render_svg(layout: &WaterfallLayout, config: &Config) -> String {
    let theme = &config.theme;
    let chart = &config.chart;
    let render = &config.render;
    let width = render.width.max(200.0);
    let height = render.height.max(200.0);
    let frame = Frame::new(render);
    let padding = f64::from(render.band_padding);

    let band = BandScale::new(layout.blocks.len(), (0.0, frame.width), padding);
    let y = LinearScale::new(
        (layout.domain.min, layout.domain.max),
        (frame.height, 0.0),
    );

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({:.2},{:.2})\">",
        frame.left, frame.top
    ));

    if chart.show_gridlines {
        for tick in y.ticks(render.grid_ticks) {
            let ty = y.map(tick) + 0.5;
            svg.push_str(&format!(
                "<line class=\"horizontalGrid\" x1=\"10\" x2=\"{:.2}\" y1=\"{ty:.2}\" y2=\"{ty:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\" shape-rendering=\"crispEdges\"/>",
                frame.width, theme.grid_color
            ));
        }
    }

    svg.push_str(&y_axis_svg(&y, render.y_ticks, theme));
    svg.push_str(&x_axis_svg(layout, &band, &y, &frame, theme));

    for (idx, block) in layout.blocks.iter().enumerate() {
        svg.push_str(&bar_svg(block, idx, &band, &y, padding, config));
    }

    svg.push_str("</g></svg>");
    tracing::trace!(bytes = svg.len(), blocks = layout.blocks.len(), "rendered waterfall svg");
    svg
}

fn y_axis_svg(y: &LinearScale, count: usize, theme: &Theme) -> String {
    let mut out = String::from("<g class=\"y axis\">");
    for tick in y.ticks(count) {
        let text = format_axis_tick(tick);
        if text.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "<text x=\"-6\" y=\"{:.2}\" dy=\"0.32em\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            y.map(tick),
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&text)
        ));
    }
    out.push_str("</g>");
    out
}

fn x_axis_svg(
    layout: &WaterfallLayout,
    band: &BandScale,
    y: &LinearScale,
    frame: &Frame,
    theme: &Theme,
) -> String {
    // The category axis sits on the zero line, kept inside the plot.
    let axis_y = (y.map(0.0) + 5.0).clamp(0.0, frame.height + 5.0);
    let mut out = format!(
        "<g class=\"x axis\" transform=\"translate(0,{axis_y:.2})\">"
    );
    out.push_str(&format!(
        "<line class=\"domain\" x1=\"0\" x2=\"{:.2}\" y1=\"-5\" y2=\"-5\" stroke=\"{}\" stroke-width=\"1\" shape-rendering=\"crispEdges\"/>",
        frame.width, theme.axis_color
    ));
    for (idx, block) in layout.blocks.iter().enumerate() {
        let x = band.position(idx) + band.bandwidth() / 2.0;
        let ty = theme.font_size;
        out.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{ty:.2}\" dx=\"-0.8em\" dy=\"-0.5em\" text-anchor=\"end\" transform=\"rotate(-45 {x:.2} {ty:.2})\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&block.name)
        ));
    }
    out.push_str("</g>");
    out
}

fn bar_svg(
    block: &Block,
    idx: usize,
    band: &BandScale,
    y: &LinearScale,
    padding: f64,
    config: &Config,
) -> String {
    let theme = &config.theme;
    let chart = &config.chart;
    let x = band.position(idx);
    let bandwidth = band.bandwidth();
    let (low, high) = block.extent();
    let top = y.map(high);
    let bar_height = (y.map(low) - top).abs();
    let label = format_label(block, chart.label_type);
    let kind = match block.kind {
        BlockKind::Standalone => "standalone",
        BlockKind::Baseline => "baseline",
        BlockKind::Delta => "delta",
        BlockKind::Total => "total",
    };

    let mut out = format!(
        "<g class=\"bar {kind}\" transform=\"translate({x:.2},0)\" fill=\"{}\">",
        escape_xml(&block.color)
    );
    out.push_str(&format!(
        "<title>{}: {}</title>",
        escape_xml(&block.tooltip_label),
        escape_xml(&label)
    ));
    out.push_str(&format!(
        "<rect y=\"{top:.2}\" width=\"{bandwidth:.2}\" height=\"{bar_height:.2}\"/>"
    ));

    let edge = y.map(block.domain_high());
    if chart.value_labels && !label.is_empty() {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dy=\"0.75em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            bandwidth / 2.0,
            edge + 5.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.label_color,
            escape_xml(&label)
        ));
    }

    if chart.show_lines_between_blocks && block.kind != BlockKind::Total {
        let x1 = bandwidth + 5.0;
        let x2 = bandwidth / (1.0 - padding).max(f64::EPSILON) - 5.0;
        out.push_str(&format!(
            "<line class=\"connector\" x1=\"{x1:.2}\" y1=\"{edge:.2}\" x2=\"{x2:.2}\" y2=\"{edge:.2}\" stroke=\"{}\" stroke-dasharray=\"3\" stroke-width=\"1\"/>",
            theme.connector_color
        ));
    }

    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}
