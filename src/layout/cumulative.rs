use crate::color::{ColorOverride, ColorResolver};
use crate::config::Config;
use crate::format::humanize_value;
use crate::query::{Field, Fields, Row};
use crate::theme::Theme;

use super::{
    Block, BlockKind, EMPTY_PLACEHOLDER, LayoutError, NAME_SEPARATOR, TOTAL_LABEL, Totals, cell,
    measure_value, rendered_or_humanized,
};

pub(super) fn layout_single_measure(
    rows: &[Row],
    fields: &Fields,
    totals: &Totals,
    config: &Config,
    overrides: &[ColorOverride],
) -> Result<Vec<Block>, LayoutError> {
    let measure = &fields.measure_like[0];
    let mut resolver = ColorResolver::new(overrides, &config.chart.color_range);
    let mut blocks = Vec::with_capacity(rows.len() + 1);

    let cumulative = push_deltas(
        rows,
        &fields.dimension_like,
        measure,
        0.0,
        totals,
        &mut resolver,
        &mut blocks,
    )?;
    blocks.push(total_block(cumulative, &config.theme));
    Ok(blocks)
}

pub(super) fn layout_baseline_delta(
    rows: &[Row],
    fields: &Fields,
    totals: &Totals,
    config: &Config,
    overrides: &[ColorOverride],
) -> Result<Vec<Block>, LayoutError> {
    let base = &fields.measure_like[0];
    let measure = &fields.measure_like[1];
    let mut resolver = ColorResolver::new(overrides, &config.chart.color_range);
    let mut blocks = Vec::with_capacity(rows.len() + 2);
    let mut cumulative = 0.0;

    if let Some(first) = rows.first() {
        let value = totals.baseline;
        let rendered = if config.chart.sum_for_baseline {
            humanize_value(value)
        } else {
            rendered_or_humanized(cell(first, 0, base)?, value)
        };
        blocks.push(Block {
            kind: BlockKind::Baseline,
            name: base.group_label().to_string(),
            key: None,
            value,
            rendered,
            start: Some(0.0),
            end: Some(value),
            percent: totals.percent(value),
            tooltip_label: base.group_label().to_string(),
            color: config.theme.baseline_color.clone(),
        });
        cumulative += value;
    }

    let cumulative = push_deltas(
        rows,
        &fields.dimension_like,
        measure,
        cumulative,
        totals,
        &mut resolver,
        &mut blocks,
    )?;
    blocks.push(total_block(cumulative, &config.theme));
    Ok(blocks)
}

/// Appends one delta block per row and returns the running sum after the last.
fn push_deltas(
    rows: &[Row],
    dimensions: &[Field],
    measure: &Field,
    mut cumulative: f64,
    totals: &Totals,
    resolver: &mut ColorResolver<'_>,
    blocks: &mut Vec<Block>,
) -> Result<f64, LayoutError> {
    let color_dimension = &dimensions[0];
    for (row_idx, row) in rows.iter().enumerate() {
        let measure_cell = cell(row, row_idx, measure)?;
        let value = measure_value(measure_cell, row_idx, measure)?;
        let key = cell(row, row_idx, color_dimension)?.value.to_string();
        let color = resolver.resolve(&color_dimension.name, &key);

        blocks.push(Block {
            kind: BlockKind::Delta,
            name: row_name(row, row_idx, dimensions)?,
            key: Some(key),
            value,
            rendered: rendered_or_humanized(measure_cell, value),
            start: Some(cumulative),
            end: Some(cumulative + value),
            percent: totals.percent(value),
            tooltip_label: measure.group_label().to_string(),
            color,
        });
        cumulative += value;
    }
    Ok(cumulative)
}

fn row_name(row: &Row, row_idx: usize, dimensions: &[Field]) -> Result<String, LayoutError> {
    let mut parts = Vec::with_capacity(dimensions.len());
    for dimension in dimensions {
        let value = &cell(row, row_idx, dimension)?.value;
        if !value.is_blank() {
            parts.push(value.to_string().trim().to_string());
        }
    }
    if parts.is_empty() {
        return Ok(EMPTY_PLACEHOLDER.to_string());
    }
    Ok(parts.join(NAME_SEPARATOR))
}

fn total_block(cumulative: f64, theme: &Theme) -> Block {
    Block {
        kind: BlockKind::Total,
        name: TOTAL_LABEL.to_string(),
        key: None,
        value: cumulative,
        rendered: humanize_value(cumulative),
        start: Some(0.0),
        end: Some(cumulative),
        percent: None,
        tooltip_label: TOTAL_LABEL.to_string(),
        color: theme.total_color.clone(),
    }
}
