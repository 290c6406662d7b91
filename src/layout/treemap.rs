use std::cmp::Ordering;

use crate::config::TreemapConfig;
use crate::geometry::format_value_localized;

use super::{FillRef, LayoutContext, PrimitiveShape, ShapeRole, TextAnchor, WeightedItem};

/// Proportional tiling: largest item first, each cut taken across the
/// longer side of the remaining rectangle.
pub(super) fn compute_treemap_layout(
    items: &[WeightedItem],
    ctx: &LayoutContext,
    config: &TreemapConfig,
) -> Vec<PrimitiveShape> {
    let mut order: Vec<usize> = (0..items.len())
        .filter(|&idx| items[idx].value > 0.0)
        .collect();
    // Stable: equal values keep input order.
    order.sort_by(|&a, &b| {
        items[b]
            .value
            .partial_cmp(&items[a].value)
            .unwrap_or(Ordering::Equal)
    });

    let total: f64 = order.iter().map(|&idx| items[idx].value).sum();
    if order.is_empty() || total <= 0.0 {
        return Vec::new();
    }

    let mut remaining = TreemapRect::new(0.0, 0.0, ctx.width, ctx.height);
    let mut remaining_total = total;
    let mut shapes = Vec::with_capacity(order.len() * 3);

    for (position, &idx) in order.iter().enumerate() {
        if remaining.is_empty() || remaining_total <= 0.0 {
            break;
        }
        let item = &items[idx];
        let is_last = position + 1 == order.len();
        let tile = if is_last {
            remaining
        } else {
            let area = item.value / remaining_total * remaining.area();
            let (tile, rest) = remaining.cut(area);
            remaining = rest;
            tile
        };
        remaining_total -= item.value;

        let palette_idx = position % ctx.palette_len;
        shapes.push(PrimitiveShape::rect(
            tile.x,
            tile.y,
            tile.w,
            tile.h,
            FillRef::Palette(palette_idx),
            ShapeRole::Tile {
                item: idx,
                value: item.value,
            },
        ));
        if tile.w >= config.min_label_width && tile.h >= config.min_label_height {
            let ink = FillRef::Contrast(palette_idx);
            push_tile_labels(&mut shapes, tile, item, ink, ctx, config);
        }
    }

    shapes
}

fn push_tile_labels(
    shapes: &mut Vec<PrimitiveShape>,
    tile: TreemapRect,
    item: &WeightedItem,
    ink: FillRef,
    ctx: &LayoutContext,
    config: &TreemapConfig,
) {
    let center_x = tile.x + tile.w / 2.0;
    let center_y = tile.y + tile.h / 2.0;
    let block = config.label_font_size + config.label_line_gap + config.value_font_size;
    let name_y = center_y - block / 2.0 + config.label_font_size;
    let value_y = name_y + config.label_line_gap + config.value_font_size;
    shapes.push(PrimitiveShape::text(
        center_x,
        name_y,
        TextAnchor::Middle,
        config.label_font_size,
        item.label.clone(),
        ink,
    ));
    shapes.push(PrimitiveShape::text(
        center_x,
        value_y,
        TextAnchor::Middle,
        config.value_font_size,
        format_value_localized(item.value, ctx.directionality),
        ink,
    ));
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TreemapRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl TreemapRect {
    fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    fn area(self) -> f64 {
        self.w * self.h
    }

    fn is_empty(self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Splits off `area` as a full-height column when the rectangle is at
    /// least as wide as it is tall, otherwise as a full-width row.
    fn cut(self, area: f64) -> (Self, Self) {
        if self.w >= self.h {
            let w = (area / self.h).clamp(0.0, self.w);
            (
                Self::new(self.x, self.y, w, self.h),
                Self::new(self.x + w, self.y, self.w - w, self.h),
            )
        } else {
            let h = (area / self.w).clamp(0.0, self.h);
            (
                Self::new(self.x, self.y, self.w, h),
                Self::new(self.x, self.y + h, self.w, self.h - h),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Directionality;
    use crate::layout::{Geometry, PrimitiveKind};
    use float_cmp::approx_eq;

    fn ctx(width: f64, height: f64) -> LayoutContext {
        LayoutContext {
            width,
            height,
            directionality: Directionality::Ltr,
            palette_len: 8,
        }
    }

    fn item(label: &str, value: f64) -> WeightedItem {
        WeightedItem {
            label: label.to_string(),
            value,
        }
    }

    fn rects(shapes: &[PrimitiveShape]) -> Vec<(f64, f64, f64, f64)> {
        shapes
            .iter()
            .filter_map(|shape| match shape.geometry {
                Geometry::Rect {
                    x,
                    y,
                    width,
                    height,
                } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_items_cut_columns_in_value_ratio() {
        let shapes = compute_treemap_layout(
            &[item("A", 60.0), item("B", 40.0)],
            &ctx(200.0, 100.0),
            &TreemapConfig::default(),
        );
        let tiles = rects(&shapes);
        assert_eq!(tiles.len(), 2);
        let (ax, ay, aw, ah) = tiles[0];
        let (bx, _, bw, bh) = tiles[1];
        assert!(approx_eq!(f64, aw, 120.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, bw, 80.0, epsilon = 1e-9));
        assert_eq!((ax, ay, ah, bh), (0.0, 0.0, 100.0, 100.0));
        assert!(approx_eq!(f64, bx, 120.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, aw * ah + bw * bh, 20_000.0, epsilon = 1e-6));
    }

    #[test]
    fn single_item_fills_canvas() {
        let shapes =
            compute_treemap_layout(&[item("Only", 5.0)], &ctx(300.0, 200.0), &TreemapConfig::default());
        assert_eq!(rects(&shapes), vec![(0.0, 0.0, 300.0, 200.0)]);
    }

    #[test]
    fn zero_total_yields_nothing() {
        let shapes = compute_treemap_layout(
            &[item("A", 0.0), item("B", 0.0)],
            &ctx(300.0, 200.0),
            &TreemapConfig::default(),
        );
        assert!(shapes.is_empty());
    }

    #[test]
    fn square_remainder_cuts_a_column() {
        let shapes = compute_treemap_layout(
            &[item("A", 1.0), item("B", 1.0)],
            &ctx(100.0, 100.0),
            &TreemapConfig::default(),
        );
        let tiles = rects(&shapes);
        assert_eq!(tiles[0], (0.0, 0.0, 50.0, 100.0));
        assert_eq!(tiles[1], (50.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn items_are_placed_largest_first() {
        let shapes = compute_treemap_layout(
            &[item("small", 10.0), item("large", 90.0)],
            &ctx(100.0, 100.0),
            &TreemapConfig::default(),
        );
        let first = shapes.iter().find(|s| s.kind() == PrimitiveKind::Rect).unwrap();
        assert_eq!(
            first.role,
            ShapeRole::Tile {
                item: 1,
                value: 90.0
            }
        );
        assert_eq!(first.fill, FillRef::Palette(0));
    }

    #[test]
    fn small_tiles_render_without_labels() {
        let shapes = compute_treemap_layout(
            &[item("big", 95.0), item("tiny", 5.0)],
            &ctx(200.0, 100.0),
            &TreemapConfig::default(),
        );
        let labels: Vec<&str> = shapes
            .iter()
            .filter_map(|shape| shape.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["big", "95"]);
        assert_eq!(rects(&shapes).len(), 2);
    }

    #[test]
    fn labels_contrast_with_their_tile() {
        let shapes = compute_treemap_layout(
            &[item("A", 3.0), item("B", 2.0), item("C", 1.0)],
            &ctx(600.0, 200.0),
            &TreemapConfig::default(),
        );
        let mut current = None;
        for shape in &shapes {
            match (&shape.role, shape.fill) {
                (ShapeRole::Tile { .. }, FillRef::Palette(idx)) => current = Some(idx),
                (ShapeRole::Label, fill) => {
                    assert_eq!(Some(fill), current.map(FillRef::Contrast));
                }
                _ => {}
            }
        }
        assert!(current.is_some());
    }

    #[test]
    fn tiles_cover_canvas_exactly() {
        let items: Vec<WeightedItem> = [7.0, 3.0, 12.0, 1.0, 9.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, v)| item(&format!("i{i}"), *v))
            .collect();
        let shapes = compute_treemap_layout(&items, &ctx(640.0, 360.0), &TreemapConfig::default());
        let area: f64 = rects(&shapes).iter().map(|(_, _, w, h)| w * h).sum();
        assert!(approx_eq!(f64, area, 640.0 * 360.0, epsilon = 1e-6));
    }
}
