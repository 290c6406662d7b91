mod flow;
mod heatmap;
mod sunburst;
mod treemap;
mod types;

pub use types::*;

use flow::compute_flow_layout;
use heatmap::compute_heatmap_layout;
use sunburst::compute_sunburst_layout;
use treemap::compute_treemap_layout;

use crate::config::LayoutConfig;
use crate::ir::{DiagramDatum, DiagramKind, DiagramRequest, Directionality};
use crate::theme::{Theme, resolve_palette};
use std::collections::HashMap;

/// One weighted entity for the treemap and sunburst layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedItem {
    pub label: String,
    pub value: f64,
}

/// A datum whose row and column keys both resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GridItem {
    pub row: String,
    pub col: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// A request reduced to exactly what its layout consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutInput {
    AreaTiling(Vec<WeightedItem>),
    HeatGrid(Vec<GridItem>),
    Flow(Vec<FlowEdge>),
    RadialPartition(Vec<WeightedItem>),
}

impl LayoutInput {
    /// Builds the layout input from a request, dropping datums with invalid
    /// values or missing structural keys.
    pub fn from_request(request: &DiagramRequest) -> Self {
        let valid = sanitize_items(&request.items);
        resolve_input(request, &valid).0
    }

    pub fn len(&self) -> usize {
        match self {
            Self::AreaTiling(items) | Self::RadialPartition(items) => items.len(),
            Self::HeatGrid(items) => items.len(),
            Self::Flow(edges) => edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canvas facts every layout needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutContext {
    pub width: f64,
    pub height: f64,
    pub directionality: Directionality,
    pub palette_len: usize,
}

pub fn compute_layout(request: &DiagramRequest, theme: &Theme, config: &LayoutConfig) -> LayoutResult {
    let kind = request.kind.slug();
    if !(request.width.is_finite() && request.height.is_finite())
        || request.width <= 0.0
        || request.height <= 0.0
    {
        log::debug!(kind, width = request.width, height = request.height; "Degenerate canvas, nothing to lay out");
        return LayoutResult::default();
    }

    let valid = sanitize_items(&request.items);
    let (input, origins) = resolve_input(request, &valid);
    let dropped = request.items.len().saturating_sub(input.len());
    if dropped > 0 {
        log::debug!(kind, dropped; "Dropped malformed datums");
    }

    let ctx = LayoutContext {
        width: request.width,
        height: request.height,
        directionality: request.directionality,
        palette_len: resolve_palette(request, theme).len().max(1),
    };
    let primitives = match &input {
        LayoutInput::AreaTiling(items) => compute_treemap_layout(items, &ctx, &config.treemap),
        LayoutInput::HeatGrid(items) => compute_heatmap_layout(items, &ctx, &config.heatmap),
        LayoutInput::Flow(edges) => compute_flow_layout(edges, &ctx, &config.flow),
        LayoutInput::RadialPartition(items) => {
            compute_sunburst_layout(items, &ctx, &config.sunburst)
        }
    };
    let legend = derive_legend(&valid, &origins, &primitives, config.legend_cap);
    log::debug!(kind, items = input.len(), primitives = primitives.len(); "Computed layout");

    LayoutResult { primitives, legend }
}

struct ValidItem<'a> {
    datum: &'a DiagramDatum,
    value: f64,
}

fn sanitize_items(items: &[DiagramDatum]) -> Vec<ValidItem<'_>> {
    items
        .iter()
        .filter_map(|datum| effective_value(datum).map(|value| ValidItem { datum, value }))
        .collect()
}

/// The layout input plus, for every input entry, its position in `valid`.
fn resolve_input(request: &DiagramRequest, valid: &[ValidItem<'_>]) -> (LayoutInput, Vec<usize>) {
    let dir = request.directionality;
    match request.kind {
        DiagramKind::AreaTiling => (
            LayoutInput::AreaTiling(weighted_items(valid, dir)),
            (0..valid.len()).collect(),
        ),
        DiagramKind::RadialPartition => (
            LayoutInput::RadialPartition(weighted_items(valid, dir)),
            (0..valid.len()).collect(),
        ),
        DiagramKind::HeatGrid => {
            let (origins, items) = valid
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    Some((
                        idx,
                        GridItem {
                            row: item.datum.row()?.to_string(),
                            col: item.datum.col()?.to_string(),
                            value: item.value,
                        },
                    ))
                })
                .unzip();
            (LayoutInput::HeatGrid(items), origins)
        }
        DiagramKind::Flow => {
            let (origins, edges) = valid
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    Some((
                        idx,
                        FlowEdge {
                            source: item.datum.source_key()?.to_string(),
                            target: item.datum.target_key()?.to_string(),
                            value: item.value,
                        },
                    ))
                })
                .unzip();
            (LayoutInput::Flow(edges), origins)
        }
    }
}

/// A datum's own value, or the roll-up of its children when it has none.
/// `None` means the datum carries no usable value at all.
fn effective_value(datum: &DiagramDatum) -> Option<f64> {
    let own = (datum.value.is_finite() && datum.value >= 0.0).then_some(datum.value);
    if own.is_some_and(|v| v > 0.0) || datum.children.is_empty() {
        return own;
    }
    let rolled: f64 = datum.children.iter().filter_map(effective_value).sum();
    Some(rolled)
}

fn weighted_items(items: &[ValidItem<'_>], dir: Directionality) -> Vec<WeightedItem> {
    items
        .iter()
        .map(|item| WeightedItem {
            label: item.datum.display_name(dir).to_string(),
            value: item.value,
        })
        .collect()
}

/// Distinct legend keys in first-seen order, each paired with the fill of
/// the first primitive drawn for a datum carrying that key.
fn derive_legend(
    items: &[ValidItem<'_>],
    origins: &[usize],
    primitives: &[PrimitiveShape],
    cap: usize,
) -> Vec<LegendEntry> {
    let mut fills: HashMap<usize, FillRef> = HashMap::new();
    for shape in primitives {
        let item = match shape.role {
            ShapeRole::Tile { item, .. }
            | ShapeRole::Wedge { item, .. }
            | ShapeRole::FlowLink { item, .. } => item,
            _ => continue,
        };
        if let Some(&origin) = origins.get(item) {
            fills.entry(origin).or_insert(shape.fill);
        }
    }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut legend: Vec<LegendEntry> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let key = item.datum.legend_key();
        if key.is_empty() {
            continue;
        }
        let fill = fills.get(&idx).copied();
        match slots.get(key).copied() {
            Some(slot) => {
                let entry = &mut legend[slot];
                entry.fill = entry.fill.or(fill);
            }
            None if legend.len() < cap => {
                slots.insert(key, legend.len());
                legend.push(LegendEntry {
                    label: key.to_string(),
                    fill,
                });
            }
            None => {}
        }
    }
    legend
}
