use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use dashboard_diagrams::layout::{Geometry, PrimitiveKind, ShapeRole};
use dashboard_diagrams::{
    DiagramKind, LayoutConfig, LayoutResult, Theme, compute_layout, parse_request, render_svg,
};
use float_cmp::approx_eq;

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel)
}

fn layout_fixture(rel: &str) -> (dashboard_diagrams::DiagramRequest, LayoutResult) {
    let input = std::fs::read_to_string(fixture_path(rel)).expect("fixture read failed");
    let parsed = parse_request(&input).expect("parse failed");
    let result = compute_layout(&parsed.request, &Theme::dashboard(), &LayoutConfig::default());
    (parsed.request, result)
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "treemap/basic.chart",
        "treemap/rtl.chart",
        "heatmap/basic.chart",
        "sankey/basic.chart",
        "sunburst/basic.chart",
        "json/heatmap.json",
        "json/sunburst.json5",
    ];

    for rel in candidates {
        assert!(fixture_path(rel).exists(), "fixture missing: {rel}");
        let (request, result) = layout_fixture(rel);
        assert!(!result.is_empty(), "{rel}: empty layout");
        let svg = render_svg(&result, &request, &Theme::dashboard(), &LayoutConfig::default());
        assert_valid_svg(&svg, rel);
    }
}

#[test]
fn treemap_fixture_tiles_whole_canvas() {
    let (request, result) = layout_fixture("treemap/basic.chart");
    assert_eq!(request.kind, DiagramKind::AreaTiling);
    let area: f64 = result.shapes_of(PrimitiveKind::Rect).map(|s| s.geometry.area()).sum();
    assert!(approx_eq!(f64, area, request.width * request.height, epsilon = 1e-6));
    assert_eq!(
        result.legend_labels(),
        vec!["Central", "Western", "Eastern", "Northern", "Southern"]
    );
}

#[test]
fn rtl_fixture_localizes_numbers() {
    let (request, result) = layout_fixture("treemap/rtl.chart");
    assert!(request.directionality.is_rtl());
    let labels: Vec<&str> = result
        .primitives
        .iter()
        .filter_map(|s| s.label.as_deref())
        .collect();
    assert!(labels.contains(&"\u{0662}\u{066B}\u{0665}M"));
    let svg = render_svg(&result, &request, &Theme::dashboard(), &LayoutConfig::default());
    assert!(svg.contains("direction=\"rtl\""));
    assert!(svg.contains("#087E8B"));
}

#[test]
fn heatmap_fixture_covers_every_pair() {
    let (_, result) = layout_fixture("heatmap/basic.chart");
    let cells: Vec<f64> = result
        .primitives
        .iter()
        .filter_map(|s| match s.role {
            ShapeRole::Cell { intensity, .. } => Some(intensity),
            _ => None,
        })
        .collect();
    assert_eq!(cells.len(), 9);
    assert!(cells.iter().all(|i| (0.0..=1.0).contains(i)));
    let headers: Vec<&str> = result
        .primitives
        .iter()
        .filter(|s| s.role == ShapeRole::Header)
        .filter_map(|s| s.label.as_deref())
        .collect();
    assert_eq!(headers, vec!["Riyadh", "Jeddah", "Eastern Pr...", "Jan", "Feb", "Mar"]);
}

#[test]
fn json_heatmap_drops_unkeyed_items() {
    let (request, result) = layout_fixture("json/heatmap.json");
    assert_eq!(request.width, 640.0);
    let cells = result
        .primitives
        .iter()
        .filter(|s| matches!(s.role, ShapeRole::Cell { .. }))
        .count();
    assert_eq!(cells, 4);
}

#[test]
fn sankey_fixture_conserves_flow() {
    let (_, result) = layout_fixture("sankey/basic.chart");
    let nodes: Vec<(String, f64)> = result
        .primitives
        .iter()
        .filter_map(|s| match &s.role {
            ShapeRole::FlowNode { name, total, .. } => Some((name.clone(), *total)),
            _ => None,
        })
        .collect();
    assert_eq!(nodes.len(), 6);
    let (sources, targets) = nodes.split_at(3);
    let source_sum: f64 = sources.iter().map(|(_, t)| t).sum();
    let target_sum: f64 = targets.iter().map(|(_, t)| t).sum();
    assert_eq!(source_sum, 64.0);
    assert_eq!(target_sum, 64.0);
}

#[test]
fn json5_sunburst_rolls_up_children() {
    let (request, result) = layout_fixture("json/sunburst.json5");
    assert!(request.directionality.is_rtl());
    let wedges: Vec<(f64, f64, Option<&str>)> = result
        .primitives
        .iter()
        .filter_map(|s| match s.geometry {
            Geometry::Arc {
                start_angle,
                end_angle,
                ..
            } => Some((start_angle, end_angle, s.label.as_deref())),
            _ => None,
        })
        .collect();
    assert_eq!(wedges.len(), 2);
    assert!(approx_eq!(f64, wedges[0].1 - wedges[0].0, PI, epsilon = 1e-9));
    assert_eq!(wedges[0].2, Some("الشبكة"));
    assert_eq!(result.legend_labels(), vec!["Network", "Billing"]);
}

#[test]
fn sunburst_fixture_skips_zero_items() {
    let (_, result) = layout_fixture("sunburst/basic.chart");
    assert_eq!(result.shapes_of(PrimitiveKind::Arc).count(), 3);
    assert_eq!(result.legend_labels(), vec!["Finance", "Network", "Support", "Other"]);
    // "Other" is zero-valued and draws no wedge, so it has no swatch color.
    assert!(result.legend[..3].iter().all(|entry| entry.fill.is_some()));
    assert_eq!(result.legend[3].fill, None);
}
