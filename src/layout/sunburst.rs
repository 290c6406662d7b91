use std::f64::consts::TAU;

use crate::config::SunburstConfig;
use crate::geometry::{Point, describe_arc, describe_disc, format_value_localized, polar_to_cartesian};

use super::{FillRef, Geometry, LayoutContext, PrimitiveShape, ShapeRole, TextAnchor, WeightedItem};

/// Single-ring radial partition around a center disc showing the total.
pub(super) fn compute_sunburst_layout(
    items: &[WeightedItem],
    ctx: &LayoutContext,
    config: &SunburstConfig,
) -> Vec<PrimitiveShape> {
    let total: f64 = items.iter().map(|item| item.value).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let center = Point::new(ctx.width / 2.0, ctx.height / 2.0);
    let outer = ctx.width.min(ctx.height) / 2.0 - config.margin;
    if outer <= 0.0 {
        return Vec::new();
    }
    let inner = outer * config.inner_radius_ratio.clamp(0.0, 1.0);

    // The final positive wedge is pinned to a full turn so rounding never
    // leaves a sliver.
    let last_positive = items.iter().rposition(|item| item.value > 0.0);
    let mut shapes = Vec::with_capacity(items.len() * 2 + 2);
    let mut running = 0.0f64;

    for (idx, item) in items.iter().enumerate() {
        if item.value <= 0.0 {
            continue;
        }
        let start = running;
        let end = if Some(idx) == last_positive {
            TAU
        } else {
            start + TAU * item.value / total
        };
        running = end;

        let palette_idx = idx % ctx.palette_len;
        shapes.push(PrimitiveShape {
            geometry: Geometry::Arc {
                center,
                inner_radius: inner,
                outer_radius: outer,
                start_angle: start,
                end_angle: end,
                d: describe_arc(center, inner, outer, start, end),
            },
            fill: FillRef::Palette(palette_idx),
            label: Some(item.label.clone()),
            role: ShapeRole::Wedge {
                item: idx,
                value: item.value,
            },
        });

        if end - start > config.min_label_angle {
            let anchor = polar_to_cartesian(center, (inner + outer) / 2.0, (start + end) / 2.0);
            shapes.push(PrimitiveShape::text(
                anchor.x,
                anchor.y + config.label_font_size * 0.35,
                TextAnchor::Middle,
                config.label_font_size,
                item.label.clone(),
                FillRef::Contrast(palette_idx),
            ));
        }
    }

    if inner > 0.0 {
        shapes.push(PrimitiveShape {
            geometry: Geometry::Path {
                d: describe_disc(center, inner),
                stroke_width: None,
            },
            fill: FillRef::Background,
            label: None,
            role: ShapeRole::CenterDisc { total },
        });
    }
    shapes.push(PrimitiveShape::text(
        center.x,
        center.y + config.center_font_size * 0.35,
        TextAnchor::Middle,
        config.center_font_size,
        format_value_localized(total, ctx.directionality),
        FillRef::Text,
    ));

    shapes
}
