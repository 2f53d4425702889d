//! Flat, printable view of the current layout.
//!
//! Used by the inspector binary and by snapshot tests.

use super::engine::LayoutEngine;
use crate::model::{Alignment, ItemId, ItemKind, ItemPath, SizeMode, SupplementaryKind, SupplementaryPath};
use serde::Serialize;

/// One laid-out element, in stream order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpRow {
    /// `[section, item]`, or `[section, header|footer]`.
    pub address: String,
    /// Identity.
    pub id: ItemId,
    /// Cell, header or footer.
    pub kind: ItemKind,
    /// Absolute top edge.
    pub y: f64,
    /// Width of the frame.
    pub width: f64,
    /// Height of the frame.
    pub height: f64,
    /// Sizing state.
    pub mode: SizeMode,
    /// Horizontal justification.
    pub alignment: Alignment,
}

/// Every header, cell and footer, top to bottom.
pub fn dump(engine: &LayoutEngine) -> Vec<DumpRow> {
    let mut rows = Vec::new();
    for (s, section) in engine.sections().iter().enumerate() {
        let supplementary_row = |kind: SupplementaryKind| {
            let path = SupplementaryPath { section: s, kind };
            let model = section.supplementary(kind)?;
            let attributes = engine.supplementary_attributes(path)?;
            Some(DumpRow {
                address: format!("[{s}, {}]", kind_label(kind.into())),
                id: model.id().clone(),
                kind: attributes.kind,
                y: attributes.frame.y,
                width: attributes.frame.width,
                height: attributes.frame.height,
                mode: attributes.size_mode,
                alignment: attributes.alignment,
            })
        };

        rows.extend(supplementary_row(SupplementaryKind::Header));
        for (i, model) in section.items().iter().enumerate() {
            let path = ItemPath::new(s, i);
            if let Some(attributes) = engine.attributes(path) {
                rows.push(DumpRow {
                    address: path.to_string(),
                    id: model.id().clone(),
                    kind: attributes.kind,
                    y: attributes.frame.y,
                    width: attributes.frame.width,
                    height: attributes.frame.height,
                    mode: attributes.size_mode,
                    alignment: attributes.alignment,
                });
            }
        }
        rows.extend(supplementary_row(SupplementaryKind::Footer));
    }
    rows
}

/// Column-aligned text, one row per line.
pub fn render_text(rows: &[DumpRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{:<12} {:<10} {:<7} {:<9} {:<8} {}",
                row.address,
                row.id.as_str(),
                kind_label(row.kind),
                format!("y={}", row.y),
                format!("h={}", row.height),
                mode_label(row.mode),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Cell => "cell",
        ItemKind::Header => "header",
        ItemKind::Footer => "footer",
    }
}

fn mode_label(mode: SizeMode) -> &'static str {
    match mode {
        SizeMode::Auto => "auto",
        SizeMode::Estimated => "estimated",
        SizeMode::Exact => "exact",
    }
}
