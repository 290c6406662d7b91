use crate::ir::{DiagramKind, DiagramRequest, Directionality};
use crate::layout::{LayoutResult, LegendEntry, PrimitiveKind, PrimitiveShape};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serializable snapshot of one layout, for debugging and regression fixtures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub kind: DiagramKind,
    pub directionality: Directionality,
    pub width: f64,
    pub height: f64,
    pub item_count: usize,
    pub counts: PrimitiveCounts,
    pub legend: &'a [LegendEntry],
    pub primitives: &'a [PrimitiveShape],
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct PrimitiveCounts {
    pub rect: usize,
    pub arc: usize,
    pub path: usize,
    pub text: usize,
}

impl PrimitiveCounts {
    fn tally(primitives: &[PrimitiveShape]) -> Self {
        let mut counts = Self::default();
        for shape in primitives {
            match shape.kind() {
                PrimitiveKind::Rect => counts.rect += 1,
                PrimitiveKind::Arc => counts.arc += 1,
                PrimitiveKind::Path => counts.path += 1,
                PrimitiveKind::Text => counts.text += 1,
            }
        }
        counts
    }
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(result: &'a LayoutResult, request: &DiagramRequest) -> Self {
        LayoutDump {
            kind: request.kind,
            directionality: request.directionality,
            width: request.width,
            height: request.height,
            item_count: request.items.len(),
            counts: PrimitiveCounts::tally(&result.primitives),
            legend: &result.legend,
            primitives: &result.primitives,
        }
    }
}

pub fn write_layout_dump(path: &Path, result: &LayoutResult, request: &DiagramRequest) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(result, request);
    serde_json::to_writer_pretty(writer, &dump)?;
    log::info!(path = path.display().to_string(); "Wrote layout dump");
    Ok(())
}
