use thiserror::Error;

/// Query shapes and rows the layout engine cannot place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("pivoted results are not supported ({count} pivot fields)")]
    PivotsNotSupported { count: usize },
    #[error("a waterfall needs at least one measure")]
    NoMeasures,
    #[error("a waterfall with dimensions takes at most {max} measures, found {found}")]
    TooManyMeasures { found: usize, max: usize },
    #[error("row {row} has no cell for field `{field}`")]
    MissingCell { row: usize, field: String },
    #[error("row {row}: measure `{field}` is not numeric")]
    NonNumericMeasure { row: usize, field: String },
}
