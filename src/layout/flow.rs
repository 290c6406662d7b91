use std::collections::HashMap;

use crate::config::FlowConfig;
use crate::geometry::{Point, describe_link, format_value_localized};

use super::{FillRef, FlowEdge, FlowSide, Geometry, LayoutContext, PrimitiveShape, ShapeRole, TextAnchor};

/// Two-column flow diagram: sources on the left, targets on the right.
///
/// Each edge occupies a slice of its source node and a slice of its target
/// node, assigned in encounter order. Slices are never re-sorted, so the
/// layout is fully determined by the input order.
pub(super) fn compute_flow_layout(
    edges: &[FlowEdge],
    ctx: &LayoutContext,
    config: &FlowConfig,
) -> Vec<PrimitiveShape> {
    let sources = FlowColumn::collect(edges.iter().map(|e| (e.source.as_str(), e.value)));
    let targets = FlowColumn::collect(edges.iter().map(|e| (e.target.as_str(), e.value)));
    if sources.is_empty() || targets.is_empty() {
        return Vec::new();
    }

    let inner_h = ctx.height - config.margin_y * 2.0;
    let grand_total = sources.column_total();
    if inner_h <= 0.0 || grand_total <= 0.0 {
        return Vec::new();
    }

    // One scale for both columns keeps link widths equal at either end.
    let scale = sources
        .scale_for(inner_h, config.node_gap)
        .min(targets.scale_for(inner_h, config.node_gap));
    if !scale.is_finite() || scale <= 0.0 {
        return Vec::new();
    }
    let source_ys = sources.stack(scale, inner_h, config);
    let target_ys = targets.stack(scale, inner_h, config);

    let left_x = config.margin_x;
    let right_x = (ctx.width - config.margin_x - config.node_width).max(left_x + config.node_width);

    let mut shapes = Vec::with_capacity(edges.len() + (sources.len() + targets.len()) * 2);
    let mut source_cursor = vec![0.0f64; sources.len()];
    let mut target_cursor = vec![0.0f64; targets.len()];

    for (item, edge) in edges.iter().enumerate() {
        let (Some(s), Some(t)) = (sources.get(&edge.source), targets.get(&edge.target)) else {
            continue;
        };
        let source_share = share(edge.value, sources.totals[s], scale);
        let target_share = share(edge.value, targets.totals[t], scale);
        let start_y = source_ys[s] + source_cursor[s] + source_share / 2.0;
        let end_y = target_ys[t] + target_cursor[t] + target_share / 2.0;
        source_cursor[s] += source_share;
        target_cursor[t] += target_share;

        let thickness = edge.value * scale;
        if thickness <= 0.0 {
            continue;
        }
        shapes.push(PrimitiveShape {
            geometry: Geometry::Path {
                d: describe_link(
                    Point::new(left_x + config.node_width, start_y),
                    Point::new(right_x, end_y),
                ),
                stroke_width: Some(thickness),
            },
            fill: FillRef::Palette(s % ctx.palette_len),
            label: None,
            role: ShapeRole::FlowLink {
                item,
                source: s,
                target: t,
                value: edge.value,
                source_share,
                target_share,
            },
        });
    }

    let target_palette_offset = sources.len();
    for (side, column, ys, x) in [
        (FlowSide::Source, &sources, &source_ys, left_x),
        (FlowSide::Target, &targets, &target_ys, right_x),
    ] {
        for (idx, name) in column.names.iter().enumerate() {
            let total = column.totals[idx];
            let height = total * scale;
            let palette_idx = match side {
                FlowSide::Source => idx,
                FlowSide::Target => target_palette_offset + idx,
            };
            shapes.push(PrimitiveShape::rect(
                x,
                ys[idx],
                config.node_width,
                height,
                FillRef::Palette(palette_idx % ctx.palette_len),
                ShapeRole::FlowNode {
                    side,
                    name: name.to_string(),
                    total,
                    height,
                },
            ));

            let (label_x, anchor) = match side {
                FlowSide::Source => (x - config.label_padding, TextAnchor::End),
                FlowSide::Target => (
                    x + config.node_width + config.label_padding,
                    TextAnchor::Start,
                ),
            };
            shapes.push(PrimitiveShape::text(
                label_x,
                ys[idx] + height / 2.0 + config.label_font_size * 0.35,
                anchor.for_direction(ctx.directionality),
                config.label_font_size,
                format!(
                    "{name} ({})",
                    format_value_localized(total, ctx.directionality)
                ),
                FillRef::Text,
            ));
        }
    }

    shapes
}

/// Vertical extent of an edge inside one of its nodes.
fn share(value: f64, node_total: f64, scale: f64) -> f64 {
    if node_total <= 0.0 {
        return 0.0;
    }
    value / node_total * (node_total * scale)
}

/// Distinct node names of one column in first-seen order, with totals.
struct FlowColumn<'a> {
    names: Vec<&'a str>,
    totals: Vec<f64>,
    index: HashMap<&'a str, usize>,
}

impl<'a> FlowColumn<'a> {
    fn collect(entries: impl Iterator<Item = (&'a str, f64)>) -> Self {
        let mut column = Self {
            names: Vec::new(),
            totals: Vec::new(),
            index: HashMap::new(),
        };
        for (name, value) in entries {
            let idx = match column.index.get(name) {
                Some(&idx) => idx,
                None => {
                    let idx = column.names.len();
                    column.index.insert(name, idx);
                    column.names.push(name);
                    column.totals.push(0.0);
                    idx
                }
            };
            column.totals[idx] += value;
        }
        column
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn column_total(&self) -> f64 {
        self.totals.iter().sum()
    }

    fn gaps(&self, gap: f64) -> f64 {
        gap * self.len().saturating_sub(1) as f64
    }

    fn scale_for(&self, inner_h: f64, gap: f64) -> f64 {
        let total = self.column_total();
        if total <= 0.0 {
            return f64::INFINITY;
        }
        (inner_h - self.gaps(gap)).max(0.0) / total
    }

    /// Top of every node, with the column centered vertically.
    fn stack(&self, scale: f64, inner_h: f64, config: &FlowConfig) -> Vec<f64> {
        let used = self.column_total() * scale + self.gaps(config.node_gap);
        let mut y = config.margin_y + ((inner_h - used) / 2.0).max(0.0);
        self.totals
            .iter()
            .map(|total| {
                let top = y;
                y += total * scale + config.node_gap;
                top
            })
            .collect()
    }
}
