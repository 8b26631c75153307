use crate::label::{LabelMode, format_label, format_tooltip};
use crate::layout::{Block, Domain, LayoutMode, WaterfallLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub mode: LayoutMode,
    pub total: f64,
    pub domain: Domain,
    pub blocks: Vec<BlockDump>,
}

#[derive(Debug, Serialize)]
pub struct BlockDump {
    #[serde(flatten)]
    pub block: Block,
    pub label: String,
    pub tooltip: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &WaterfallLayout, label_mode: LabelMode) -> Self {
        let blocks = layout
            .blocks
            .iter()
            .map(|block| {
                let label = format_label(block, label_mode);
                BlockDump {
                    block: block.clone(),
                    tooltip: format_tooltip(&block.tooltip_label, &label),
                    label,
                }
            })
            .collect();

        LayoutDump {
            mode: layout.mode,
            total: layout.total,
            domain: layout.domain,
            blocks,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &WaterfallLayout,
    label_mode: LabelMode,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, label_mode);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BlockKind;

    #[test]
    fn dump_carries_labels_and_tooltips() {
        let layout = WaterfallLayout {
            mode: LayoutMode::SingleMeasure,
            blocks: vec![Block {
                kind: BlockKind::Total,
                name: "Total".to_string(),
                key: None,
                value: 5.0,
                rendered: "5".to_string(),
                start: Some(0.0),
                end: Some(5.0),
                percent: None,
                tooltip_label: "Total".to_string(),
                color: "steelblue".to_string(),
            }],
            domain: Domain { min: 0.0, max: 5.0 },
            total: 5.0,
        };
        let dump = LayoutDump::from_layout(&layout, LabelMode::Value);
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["mode"], "single_measure");
        let block = &json["blocks"][0];
        assert_eq!(block["kind"], "total");
        assert_eq!(block["label"], "5");
        assert_eq!(block["tooltip"], "<div class=\"title\">Total</div><div>5</div>");
        assert!(block.get("percent").is_none());
        assert!(block.get("key").is_none());
    }
}
