//! Row-to-block layout of a waterfall chart.
//!
//! The query shape picks one of three [`LayoutMode`]s:
//! - no dimensions: every measure of every row becomes an independent bar
//! - one measure: each row steps the running sum, closed by a total bar
//! - two measures: the first measure forms a baseline bar in front of the
//!   steps of the second one, closed by a total bar

mod cumulative;
mod error;
mod standalone;
mod types;

use serde::Serialize;

use crate::color::ColorOverride;
use crate::config::Config;
use crate::format::humanize_value;
use crate::query::{Cell, CellValue, Field, Fields, Row};

pub use error::LayoutError;
pub use types::{Block, BlockKind, Domain, WaterfallLayout};

/// Name of a block whose source labels are all blank.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";
pub const TOTAL_LABEL: &str = "Total";
/// Joins the dimension values of a row into a block name.
pub const NAME_SEPARATOR: &str = " - ";
pub const MAX_MEASURES_WITH_DIMENSIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    NoDimension,
    SingleMeasure,
    BaselineDelta,
}

impl LayoutMode {
    pub fn select(fields: &Fields) -> Self {
        if fields.dimension_like.is_empty() {
            Self::NoDimension
        } else if fields.measure_like.len() == 2 {
            Self::BaselineDelta
        } else {
            Self::SingleMeasure
        }
    }
}

/// Rejects field sets no mode can lay out.
pub fn validate_shape(fields: &Fields) -> Result<(), LayoutError> {
    if !fields.pivots.is_empty() {
        return Err(LayoutError::PivotsNotSupported {
            count: fields.pivots.len(),
        });
    }
    if fields.measure_like.is_empty() {
        return Err(LayoutError::NoMeasures);
    }
    if !fields.dimension_like.is_empty()
        && fields.measure_like.len() > MAX_MEASURES_WITH_DIMENSIONS
    {
        return Err(LayoutError::TooManyMeasures {
            found: fields.measure_like.len(),
            max: MAX_MEASURES_WITH_DIMENSIONS,
        });
    }
    Ok(())
}

pub fn compute_layout(
    rows: &[Row],
    fields: &Fields,
    config: &Config,
    overrides: &[ColorOverride],
) -> Result<WaterfallLayout, LayoutError> {
    validate_shape(fields)?;
    let mode = LayoutMode::select(fields);
    let totals = Totals::compute(rows, fields, config.chart.sum_for_baseline)?;

    let blocks = match mode {
        LayoutMode::NoDimension => {
            standalone::layout_standalone(rows, &fields.measure_like, &config.theme)?
        }
        LayoutMode::SingleMeasure => {
            cumulative::layout_single_measure(rows, fields, &totals, config, overrides)?
        }
        LayoutMode::BaselineDelta => {
            cumulative::layout_baseline_delta(rows, fields, &totals, config, overrides)?
        }
    };
    let domain = Domain::of_blocks(&blocks);

    tracing::debug!(
        ?mode,
        rows = rows.len(),
        blocks = blocks.len(),
        total = totals.total,
        min = domain.min,
        max = domain.max,
        "computed waterfall layout"
    );

    Ok(WaterfallLayout {
        mode,
        blocks,
        domain,
        total: totals.total,
    })
}

/// Sums computed once per layout call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Totals {
    /// Value of the baseline block; zero without a baseline measure.
    pub baseline: f64,
    /// Baseline plus every row of the stepping measure.
    pub total: f64,
}

impl Totals {
    fn compute(rows: &[Row], fields: &Fields, sum_for_baseline: bool) -> Result<Self, LayoutError> {
        let measures = &fields.measure_like;
        let (base, measure) = if measures.len() == 2 {
            (Some(&measures[0]), &measures[1])
        } else {
            (None, &measures[0])
        };

        let baseline = match base {
            Some(base) if sum_for_baseline => sum_measure(rows, base)?,
            Some(base) => match rows.first() {
                Some(row) => measure_value(cell(row, 0, base)?, 0, base)?,
                None => 0.0,
            },
            None => 0.0,
        };
        let total = baseline + sum_measure(rows, measure)?;
        Ok(Self { baseline, total })
    }

    /// Share of the grand total; undefined when the total is zero.
    pub(crate) fn percent(&self, value: f64) -> Option<f64> {
        if self.total == 0.0 {
            return None;
        }
        let percent = value / self.total;
        percent.is_finite().then_some(percent)
    }
}

fn sum_measure(rows: &[Row], field: &Field) -> Result<f64, LayoutError> {
    rows.iter().enumerate().try_fold(0.0, |acc, (idx, row)| {
        Ok::<f64, LayoutError>(acc + measure_value(cell(row, idx, field)?, idx, field)?)
    })
}

pub(crate) fn cell<'a>(row: &'a Row, row_idx: usize, field: &Field) -> Result<&'a Cell, LayoutError> {
    row.get(&field.name).ok_or_else(|| LayoutError::MissingCell {
        row: row_idx,
        field: field.name.clone(),
    })
}

/// Numeric value of a measure cell. `null` counts as zero.
pub(crate) fn measure_value(cell: &Cell, row_idx: usize, field: &Field) -> Result<f64, LayoutError> {
    match &cell.value {
        CellValue::Number(value) => Ok(*value),
        CellValue::Null => Ok(0.0),
        CellValue::Text(_) => Err(LayoutError::NonNumericMeasure {
            row: row_idx,
            field: field.name.clone(),
        }),
    }
}

/// The host's rendered string wins over local humanization.
pub(crate) fn rendered_or_humanized(cell: &Cell, value: f64) -> String {
    cell.rendered
        .clone()
        .unwrap_or_else(|| humanize_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{LabelMode, format_label};

    fn row(cells: &[(&str, Cell)]) -> Row {
        cells
            .iter()
            .map(|(name, cell)| (name.to_string(), cell.clone()))
            .collect()
    }

    fn channel_fields(measures: &[Field]) -> Fields {
        Fields {
            dimension_like: vec![Field::new("orders.channel").with_label("Channel")],
            measure_like: measures.to_vec(),
            pivots: Vec::new(),
        }
    }

    fn budget() -> Field {
        Field::new("plan.budget")
            .with_label("Plan Budget")
            .with_group_variant("Budget")
    }

    fn delta() -> Field {
        Field::new("plan.delta")
            .with_label("Plan Delta")
            .with_group_variant("Change")
    }

    fn channel_row(channel: &str, base: f64, change: f64) -> Row {
        row(&[
            ("orders.channel", Cell::new(channel)),
            ("plan.budget", Cell::new(base)),
            ("plan.delta", Cell::new(change)),
        ])
    }

    fn assert_chained(blocks: &[Block]) {
        let cumulative: Vec<&Block> = blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Baseline | BlockKind::Delta))
            .collect();
        for block in &cumulative {
            assert_eq!(block.end, Some(block.start.unwrap() + block.value));
        }
        for pair in cumulative.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn selects_mode_from_fields() {
        let no_dims = Fields {
            measure_like: vec![budget(), delta()],
            ..Default::default()
        };
        assert_eq!(LayoutMode::select(&no_dims), LayoutMode::NoDimension);
        assert_eq!(LayoutMode::select(&channel_fields(&[delta()])), LayoutMode::SingleMeasure);
        assert_eq!(
            LayoutMode::select(&channel_fields(&[budget(), delta()])),
            LayoutMode::BaselineDelta
        );
    }

    #[test]
    fn validates_shape() {
        assert_eq!(
            validate_shape(&channel_fields(&[])),
            Err(LayoutError::NoMeasures)
        );
        assert_eq!(
            validate_shape(&channel_fields(&[budget(), delta(), delta()])),
            Err(LayoutError::TooManyMeasures { found: 3, max: 2 })
        );
        let mut pivoted = channel_fields(&[delta()]);
        pivoted.pivots.push(Field::new("orders.year"));
        assert_eq!(
            validate_shape(&pivoted),
            Err(LayoutError::PivotsNotSupported { count: 1 })
        );
        let wide = Fields {
            measure_like: vec![budget(), delta(), delta()],
            ..Default::default()
        };
        assert!(validate_shape(&wide).is_ok());
    }

    #[test]
    fn baseline_delta_layout() {
        let rows = vec![
            channel_row("Web", 100.0, 20.0),
            channel_row("Store", 50.0, -30.0),
            channel_row("Phone", 10.0, 5.0),
        ];
        let fields = channel_fields(&[budget(), delta()]);
        let layout = compute_layout(&rows, &fields, &Config::default(), &[]).unwrap();
        let blocks = &layout.blocks;

        assert_eq!(layout.mode, LayoutMode::BaselineDelta);
        assert_eq!(blocks.len(), 5);
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Baseline,
                BlockKind::Delta,
                BlockKind::Delta,
                BlockKind::Delta,
                BlockKind::Total
            ]
        );

        let baseline = &blocks[0];
        assert_eq!(baseline.name, "Budget");
        assert_eq!(baseline.value, 160.0);
        assert_eq!((baseline.start, baseline.end), (Some(0.0), Some(160.0)));
        assert_eq!(baseline.color, Config::default().theme.baseline_color);

        assert_eq!(layout.total, 155.0);
        assert_eq!(blocks[1].name, "Web");
        assert_eq!(blocks[1].tooltip_label, "Change");
        assert_eq!(blocks[2].start, Some(180.0));
        assert_eq!(blocks[2].end, Some(150.0));
        assert_eq!(blocks[2].percent, Some(-30.0 / 155.0));
        assert_chained(blocks);

        let total = &blocks[4];
        assert_eq!(total.name, TOTAL_LABEL);
        assert_eq!(total.value, 155.0);
        assert_eq!((total.start, total.end), (Some(0.0), Some(155.0)));
        assert_eq!(total.percent, None);

        assert_eq!(layout.domain, Domain { min: 0.0, max: 180.0 });
    }

    #[test]
    fn deltas_add_up_to_total() {
        let rows = vec![
            channel_row("Web", 1.0, 7.0),
            channel_row("Store", 2.0, -3.0),
            channel_row("Phone", 3.0, 11.0),
        ];
        let single = compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[])
            .unwrap();
        let sum: f64 = single
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Delta)
            .map(|b| b.value)
            .sum();
        assert_eq!(sum, single.total);

        let with_base = compute_layout(
            &rows,
            &channel_fields(&[budget(), delta()]),
            &Config::default(),
            &[],
        )
        .unwrap();
        assert_eq!(with_base.total, 6.0 + sum);
    }

    #[test]
    fn single_measure_layout() {
        let rows = vec![
            row(&[
                ("orders.channel", Cell::new("Web")),
                ("plan.delta", Cell::rendered(1500.0, "$1,500")),
            ]),
            row(&[
                ("orders.channel", Cell::new("Store")),
                ("plan.delta", Cell::new(2500.0)),
            ]),
        ];
        let layout =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap();
        assert_eq!(layout.mode, LayoutMode::SingleMeasure);
        assert_eq!(layout.blocks.len(), 3);
        assert_eq!(layout.blocks[0].rendered, "$1,500");
        assert_eq!(layout.blocks[1].rendered, "2.50 K");
        assert_eq!(layout.blocks[0].percent, Some(0.375));
        assert_eq!(layout.blocks[2].value, 4000.0);
        assert_eq!(layout.blocks[2].rendered, "4.00 K");
        assert_chained(&layout.blocks);
    }

    #[test]
    fn no_dimension_layout_emits_standalone_bars() {
        let fields = Fields {
            measure_like: vec![
                Field::new("a").with_label("Alpha").with_label_short("A"),
                Field::new("b").with_label("Beta"),
            ],
            ..Default::default()
        };
        let rows = vec![row(&[("a", Cell::new(3.0)), ("b", Cell::new(-4.0))])];
        let layout = compute_layout(&rows, &fields, &Config::default(), &[]).unwrap();
        assert_eq!(layout.mode, LayoutMode::NoDimension);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].name, "A");
        assert_eq!(layout.blocks[1].name, EMPTY_PLACEHOLDER);
        assert_eq!(layout.blocks[1].tooltip_label, "Beta");
        for block in &layout.blocks {
            assert_eq!(block.kind, BlockKind::Standalone);
            assert_eq!((block.start, block.end, block.percent), (None, None, None));
        }
        assert_eq!(layout.domain, Domain { min: 0.0, max: 3.0 });
    }

    #[test]
    fn zero_total_leaves_percent_undefined() {
        let rows = vec![channel_row("Web", 0.0, 10.0), channel_row("Store", 0.0, -10.0)];
        let layout =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap();
        assert_eq!(layout.total, 0.0);
        assert!(layout.blocks.iter().all(|b| b.percent.is_none()));
        assert_eq!(
            format_label(&layout.blocks[0], LabelMode::ValuePercentage),
            "10"
        );
    }

    #[test]
    fn negative_total_keeps_literal_percent() {
        let rows = vec![
            channel_row("Web", 0.0, -10.0),
            channel_row("Store", 0.0, 30.0),
            channel_row("Phone", 0.0, -40.0),
        ];
        let layout =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap();
        assert_eq!(layout.total, -20.0);
        assert_eq!(layout.blocks[1].percent, Some(-1.5));
        assert_eq!(layout.domain, Domain { min: -10.0, max: 20.0 });
    }

    #[test]
    fn baseline_from_first_row_when_not_summing() {
        let rows = vec![channel_row("Web", 100.0, 20.0), channel_row("Store", 100.0, 5.0)];
        let mut config = Config::default();
        config.chart.sum_for_baseline = false;
        let layout =
            compute_layout(&rows, &channel_fields(&[budget(), delta()]), &config, &[]).unwrap();
        assert_eq!(layout.blocks[0].value, 100.0);
        assert_eq!(layout.total, 125.0);
        assert_eq!(layout.blocks.last().unwrap().value, 125.0);
    }

    #[test]
    fn block_names_join_dimensions_and_skip_blanks() {
        let fields = Fields {
            dimension_like: vec![Field::new("region"), Field::new("city")],
            measure_like: vec![delta()],
            pivots: Vec::new(),
        };
        let rows = vec![
            row(&[
                ("region", Cell::new("North")),
                ("city", Cell::new("Oslo")),
                ("plan.delta", Cell::new(1.0)),
            ]),
            row(&[
                ("region", Cell::new("South")),
                ("city", Cell::default()),
                ("plan.delta", Cell::new(1.0)),
            ]),
            row(&[
                ("region", Cell::new(" ")),
                ("city", Cell::default()),
                ("plan.delta", Cell::new(1.0)),
            ]),
        ];
        let layout = compute_layout(&rows, &fields, &Config::default(), &[]).unwrap();
        let names: Vec<&str> = layout.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["North - Oslo", "South", EMPTY_PLACEHOLDER, TOTAL_LABEL]);
    }

    #[test]
    fn colors_follow_first_dimension() {
        let overrides = vec![ColorOverride::new("channel", "Store", "#000000")];
        let rows = vec![
            channel_row("Web", 0.0, 1.0),
            channel_row("Store", 0.0, 1.0),
            channel_row("Web", 0.0, 1.0),
        ];
        let config = Config::default();
        let layout =
            compute_layout(&rows, &channel_fields(&[delta()]), &config, &overrides).unwrap();
        assert_eq!(layout.blocks[0].color, config.chart.color_range[0]);
        assert_eq!(layout.blocks[1].color, "#000000");
        assert_eq!(layout.blocks[2].color, layout.blocks[0].color);
        assert_eq!(layout.blocks[0].key.as_deref(), Some("Web"));
        assert_eq!(layout.blocks[3].color, config.theme.total_color);
    }

    #[test]
    fn empty_rows() {
        let layout =
            compute_layout(&[], &channel_fields(&[budget(), delta()]), &Config::default(), &[])
                .unwrap();
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].kind, BlockKind::Total);
        assert_eq!(layout.domain, Domain::default());

        let fields = Fields {
            measure_like: vec![delta()],
            ..Default::default()
        };
        let layout = compute_layout(&[], &fields, &Config::default(), &[]).unwrap();
        assert!(layout.blocks.is_empty());
        assert_eq!(layout.domain, Domain::default());
    }

    #[test]
    fn malformed_rows_fail_fast() {
        let rows = vec![row(&[("orders.channel", Cell::new("Web"))])];
        let err =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingCell {
                row: 0,
                field: "plan.delta".to_string()
            }
        );

        let rows = vec![row(&[
            ("orders.channel", Cell::new("Web")),
            ("plan.delta", Cell::new("lots")),
        ])];
        let err =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap_err();
        assert!(matches!(err, LayoutError::NonNumericMeasure { row: 0, .. }));
    }

    #[test]
    fn null_measures_count_as_zero() {
        let rows = vec![row(&[
            ("orders.channel", Cell::new("Web")),
            ("plan.delta", Cell::default()),
        ])];
        let layout =
            compute_layout(&rows, &channel_fields(&[delta()]), &Config::default(), &[]).unwrap();
        assert_eq!(layout.blocks[0].value, 0.0);
        assert_eq!(layout.blocks[0].rendered, "0");
    }
}
