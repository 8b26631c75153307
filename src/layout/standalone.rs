use crate::query::{Field, Row};
use crate::theme::Theme;

use super::{Block, BlockKind, EMPTY_PLACEHOLDER, LayoutError, cell, measure_value, rendered_or_humanized};

/// One independent bar per measure per row, in row then measure order.
pub(super) fn layout_standalone(
    rows: &[Row],
    measures: &[Field],
    theme: &Theme,
) -> Result<Vec<Block>, LayoutError> {
    let mut blocks = Vec::with_capacity(rows.len() * measures.len());
    for (row_idx, row) in rows.iter().enumerate() {
        for measure in measures {
            let cell = cell(row, row_idx, measure)?;
            let value = measure_value(cell, row_idx, measure)?;
            blocks.push(Block {
                kind: BlockKind::Standalone,
                name: measure
                    .label_short
                    .clone()
                    .unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string()),
                key: None,
                value,
                rendered: rendered_or_humanized(cell, value),
                start: None,
                end: None,
                percent: None,
                tooltip_label: measure.display_label().to_string(),
                color: theme.standalone_color.clone(),
            });
        }
    }
    Ok(blocks)
}
