use serde::Serialize;

use super::LayoutMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Independent bar of a chart without dimensions.
    Standalone,
    /// Synthetic first block holding the baseline measure.
    Baseline,
    /// One row's step along the running sum.
    Delta,
    /// Synthetic last block holding the running sum.
    Total,
}

/// One positioned, colored, labeled bar of the waterfall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    /// Dimension value the color was resolved from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: f64,
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    pub tooltip_label: String,
    pub color: String,
}

impl Block {
    /// Lower end of the bar along the value axis as the domain sees it.
    pub fn domain_low(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// Upper end of the bar along the value axis as the domain sees it.
    pub fn domain_high(&self) -> f64 {
        self.end.unwrap_or(self.value)
    }

    /// Value-axis span the bar covers, ordered low to high.
    pub fn extent(&self) -> (f64, f64) {
        let (a, b) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => (0.0, self.value),
        };
        if a <= b { (a, b) } else { (b, a) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn of_blocks(blocks: &[Block]) -> Self {
        if blocks.is_empty() {
            return Self::default();
        }
        let min = blocks
            .iter()
            .map(Block::domain_low)
            .fold(f64::INFINITY, f64::min);
        let max = blocks
            .iter()
            .map(Block::domain_high)
            .fold(f64::NEG_INFINITY, f64::max);
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallLayout {
    pub mode: LayoutMode,
    pub blocks: Vec<Block>,
    pub domain: Domain,
    /// Grand total every `percent` in this layout is relative to.
    pub total: f64,
}
