use std::collections::HashMap;

use crate::config::{HeatmapConfig, HeatmapNormalization};
use crate::geometry::{format_value_localized, truncate_label};

use super::{FillRef, GridItem, Ink, LayoutContext, PrimitiveShape, ShapeRole, TextAnchor};

pub(super) fn compute_heatmap_layout(
    items: &[GridItem],
    ctx: &LayoutContext,
    config: &HeatmapConfig,
) -> Vec<PrimitiveShape> {
    let rows = KeyIndex::collect(items.iter().map(|item| item.row.as_str()));
    let cols = KeyIndex::collect(items.iter().map(|item| item.col.as_str()));
    if rows.is_empty() || cols.is_empty() {
        return Vec::new();
    }

    let inner_w = ctx.width - config.margin_left - config.margin_right;
    let inner_h = ctx.height - config.margin_top - config.margin_bottom;
    if inner_w <= 0.0 || inner_h <= 0.0 {
        return Vec::new();
    }
    let cell_w = inner_w / cols.len() as f64;
    let cell_h = inner_h / rows.len() as f64;

    let ranges = ValueRanges::compute(items, &rows, &cols, config.normalization);
    let mut shapes = Vec::with_capacity(rows.len() + cols.len() + items.len() * 2);

    for (row, key) in rows.keys.iter().enumerate() {
        let y = config.margin_top + cell_h * (row as f64 + 0.5) + config.header_font_size * 0.35;
        shapes.push(header(
            config.margin_left - 6.0,
            y,
            TextAnchor::End,
            key,
            config,
        ));
    }
    for (col, key) in cols.keys.iter().enumerate() {
        let x = config.margin_left + cell_w * (col as f64 + 0.5);
        shapes.push(header(
            x,
            config.margin_top - 8.0,
            TextAnchor::Middle,
            key,
            config,
        ));
    }

    let palette_max = ctx.palette_len.max(1) - 1;
    for item in items {
        let (Some(row), Some(col)) = (rows.get(&item.row), cols.get(&item.col)) else {
            continue;
        };
        let (min, max) = ranges.range_for(row, col);
        let intensity = normalize(item.value, min, max);
        let palette_idx = ((intensity * palette_max as f64).floor() as usize).min(palette_max);
        let x = config.margin_left + cell_w * col as f64;
        let y = config.margin_top + cell_h * row as f64;

        shapes.push(PrimitiveShape::rect(
            x,
            y,
            cell_w,
            cell_h,
            FillRef::Palette(palette_idx),
            ShapeRole::Cell {
                row,
                col,
                value: item.value,
                intensity,
            },
        ));
        if config.show_values {
            let ink = if intensity > 0.5 { Ink::Light } else { Ink::Dark };
            shapes.push(PrimitiveShape::text(
                x + cell_w / 2.0,
                y + cell_h / 2.0 + config.value_font_size * 0.35,
                TextAnchor::Middle,
                config.value_font_size,
                format_value_localized(item.value, ctx.directionality),
                FillRef::Ink(ink),
            ));
        }
    }

    shapes
}

fn header(x: f64, y: f64, anchor: TextAnchor, key: &str, config: &HeatmapConfig) -> PrimitiveShape {
    let mut shape = PrimitiveShape::text(
        x,
        y,
        anchor,
        config.header_font_size,
        truncate_label(key, config.header_max_chars),
        FillRef::Text,
    );
    shape.role = ShapeRole::Header;
    shape
}

/// `(value - min) / (max - min)` clamped to `[0, 1]`; a flat range maps to 0.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Distinct keys in first-seen order.
struct KeyIndex<'a> {
    keys: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
}

impl<'a> KeyIndex<'a> {
    fn collect(keys: impl Iterator<Item = &'a str>) -> Self {
        let mut out = Self {
            keys: Vec::new(),
            index: HashMap::new(),
        };
        for key in keys {
            if !out.index.contains_key(key) {
                out.index.insert(key, out.keys.len());
                out.keys.push(key);
            }
        }
        out
    }

    fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

enum ValueRanges {
    Global((f64, f64)),
    PerRow(Vec<(f64, f64)>),
    PerColumn(Vec<(f64, f64)>),
}

impl ValueRanges {
    fn compute(
        items: &[GridItem],
        rows: &KeyIndex<'_>,
        cols: &KeyIndex<'_>,
        mode: HeatmapNormalization,
    ) -> Self {
        let empty = (f64::INFINITY, f64::NEG_INFINITY);
        let widen = |range: &mut (f64, f64), value: f64| {
            range.0 = range.0.min(value);
            range.1 = range.1.max(value);
        };
        match mode {
            HeatmapNormalization::Global => {
                let mut range = empty;
                for item in items {
                    widen(&mut range, item.value);
                }
                Self::Global(range)
            }
            HeatmapNormalization::PerRow => {
                let mut ranges = vec![empty; rows.len()];
                for item in items {
                    if let Some(row) = rows.get(&item.row) {
                        widen(&mut ranges[row], item.value);
                    }
                }
                Self::PerRow(ranges)
            }
            HeatmapNormalization::PerColumn => {
                let mut ranges = vec![empty; cols.len()];
                for item in items {
                    if let Some(col) = cols.get(&item.col) {
                        widen(&mut ranges[col], item.value);
                    }
                }
                Self::PerColumn(ranges)
            }
        }
    }

    fn range_for(&self, row: usize, col: usize) -> (f64, f64) {
        match self {
            Self::Global(range) => *range,
            Self::PerRow(ranges) => ranges[row],
            Self::PerColumn(ranges) => ranges[col],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Directionality;
    use std::collections::HashSet;

    fn ctx() -> LayoutContext {
        LayoutContext {
            width: 400.0,
            height: 250.0,
            directionality: Directionality::Ltr,
            palette_len: 9,
        }
    }

    fn cell(row: &str, col: &str, value: f64) -> GridItem {
        GridItem {
            row: row.to_string(),
            col: col.to_string(),
            value,
        }
    }

    fn cells(shapes: &[PrimitiveShape]) -> Vec<(usize, usize, f64)> {
        shapes
            .iter()
            .filter_map(|shape| match shape.role {
                ShapeRole::Cell {
                    row,
                    col,
                    intensity,
                    ..
                } => Some((row, col, intensity)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_by_three_grid_emits_six_cells() {
        let mut items = Vec::new();
        for (r, row) in ["Riyadh", "Jeddah"].iter().enumerate() {
            for (c, col) in ["Jan", "Feb", "Mar"].iter().enumerate() {
                items.push(cell(row, col, (r * 3 + c) as f64));
            }
        }
        let shapes = compute_heatmap_layout(&items, &ctx(), &HeatmapConfig::default());
        let cells = cells(&shapes);
        assert_eq!(cells.len(), 6);
        let distinct: HashSet<(usize, usize)> = cells.iter().map(|(r, c, _)| (*r, *c)).collect();
        assert_eq!(distinct.len(), 6);
        assert!(cells.iter().all(|(_, _, i)| (0.0..=1.0).contains(i)));
        assert_eq!(cells[0].2, 0.0);
        assert_eq!(cells[5].2, 1.0);
    }

    #[test]
    fn flat_values_map_to_zero_intensity() {
        let items = vec![cell("a", "x", 5.0), cell("b", "y", 5.0)];
        let shapes = compute_heatmap_layout(&items, &ctx(), &HeatmapConfig::default());
        assert!(cells(&shapes).iter().all(|(_, _, i)| *i == 0.0));
        assert!(shapes.iter().any(|s| s.fill == FillRef::Palette(0)));
    }

    #[test]
    fn palette_index_follows_intensity() {
        let items = vec![cell("a", "x", 0.0), cell("a", "y", 50.0), cell("a", "z", 100.0)];
        let shapes = compute_heatmap_layout(&items, &ctx(), &HeatmapConfig::default());
        let fills: Vec<FillRef> = shapes
            .iter()
            .filter(|s| matches!(s.role, ShapeRole::Cell { .. }))
            .map(|s| s.fill)
            .collect();
        assert_eq!(
            fills,
            vec![FillRef::Palette(0), FillRef::Palette(4), FillRef::Palette(8)]
        );
    }

    #[test]
    fn label_ink_switches_above_half_intensity() {
        let items = vec![cell("a", "x", 0.0), cell("a", "y", 100.0)];
        let shapes = compute_heatmap_layout(&items, &ctx(), &HeatmapConfig::default());
        let inks: Vec<FillRef> = shapes
            .iter()
            .filter(|s| matches!(s.role, ShapeRole::Label))
            .map(|s| s.fill)
            .collect();
        assert_eq!(inks, vec![FillRef::Ink(Ink::Dark), FillRef::Ink(Ink::Light)]);
    }

    #[test]
    fn long_headers_are_truncated() {
        let items = vec![cell("Eastern Province", "January", 1.0)];
        let shapes = compute_heatmap_layout(&items, &ctx(), &HeatmapConfig::default());
        let headers: Vec<&str> = shapes
            .iter()
            .filter(|s| s.role == ShapeRole::Header)
            .filter_map(|s| s.label.as_deref())
            .collect();
        assert_eq!(headers, vec!["Eastern Pr...", "January"]);
    }

    #[test]
    fn per_row_normalization_scales_each_row() {
        let items = vec![
            cell("a", "x", 1.0),
            cell("a", "y", 2.0),
            cell("b", "x", 100.0),
            cell("b", "y", 200.0),
        ];
        let config = HeatmapConfig {
            normalization: HeatmapNormalization::PerRow,
            ..HeatmapConfig::default()
        };
        let intensities: Vec<f64> = cells(&compute_heatmap_layout(&items, &ctx(), &config))
            .into_iter()
            .map(|(_, _, i)| i)
            .collect();
        assert_eq!(intensities, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn canvas_smaller_than_margins_yields_nothing() {
        let small = LayoutContext {
            width: 50.0,
            ..ctx()
        };
        let shapes = compute_heatmap_layout(&[cell("a", "x", 1.0)], &small, &HeatmapConfig::default());
        assert!(shapes.is_empty());
    }
}
