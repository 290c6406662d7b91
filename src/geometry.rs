//! Pure geometry helpers shared by the layouts: polar conversion, arc paths
//! and compact number formatting.

use std::f64::consts::{PI, TAU};

use serde::Serialize;

use crate::ir::Directionality;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Angle is measured clockwise from "up" (12 o'clock).
pub fn polar_to_cartesian(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        center.x + radius * angle.sin(),
        center.y - radius * angle.cos(),
    )
}

/// Closed annular wedge: outer arc forward, inner arc backward.
///
/// An inner radius of zero degenerates into a pie slice that closes through
/// the center. A span of a full turn is drawn with [`describe_ring`], since a
/// single SVG arc whose endpoints coincide renders nothing.
pub fn describe_arc(
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    start_angle: f64,
    end_angle: f64,
) -> String {
    if end_angle - start_angle >= TAU - FULL_TURN_EPSILON {
        return describe_ring(center, inner_radius, outer_radius);
    }
    let outer_start = polar_to_cartesian(center, outer_radius, start_angle);
    let outer_end = polar_to_cartesian(center, outer_radius, end_angle);
    let large_arc = if end_angle - start_angle > PI { 1 } else { 0 };

    let mut d = format!(
        "M {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2}",
        outer_start.x, outer_start.y, outer_radius, outer_radius, large_arc, outer_end.x, outer_end.y
    );
    if inner_radius > 0.0 {
        let inner_end = polar_to_cartesian(center, inner_radius, end_angle);
        let inner_start = polar_to_cartesian(center, inner_radius, start_angle);
        d.push_str(&format!(
            " L {:.2} {:.2} A {:.2} {:.2} 0 {} 0 {:.2} {:.2}",
            inner_end.x, inner_end.y, inner_radius, inner_radius, large_arc, inner_start.x, inner_start.y
        ));
    } else {
        d.push_str(&format!(" L {:.2} {:.2}", center.x, center.y));
    }
    d.push_str(" Z");
    d
}

const FULL_TURN_EPSILON: f64 = 1e-9;

/// Full annulus: the outer circle clockwise, the inner circle counter-clockwise
/// so the nonzero fill rule leaves the hole empty.
pub fn describe_ring(center: Point, inner_radius: f64, outer_radius: f64) -> String {
    let mut d = describe_disc(center, outer_radius);
    if inner_radius > 0.0 {
        let top = Point::new(center.x, center.y - inner_radius);
        let bottom = Point::new(center.x, center.y + inner_radius);
        d.push_str(&format!(
            " M {:.2} {:.2} A {r:.2} {r:.2} 0 1 0 {:.2} {:.2} A {r:.2} {r:.2} 0 1 0 {:.2} {:.2} Z",
            top.x,
            top.y,
            bottom.x,
            bottom.y,
            top.x,
            top.y,
            r = inner_radius
        ));
    }
    d
}

/// Full circle as two half arcs.
pub fn describe_disc(center: Point, radius: f64) -> String {
    let top = Point::new(center.x, center.y - radius);
    let bottom = Point::new(center.x, center.y + radius);
    format!(
        "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
        top.x,
        top.y,
        bottom.x,
        bottom.y,
        top.x,
        top.y,
        r = radius
    )
}

/// Cubic link between two points with horizontal tangents at both ends.
pub fn describe_link(start: Point, end: Point) -> String {
    let mid_x = (start.x + end.x) / 2.0;
    format!(
        "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
        start.x, start.y, mid_x, start.y, mid_x, end.y, end.x, end.y
    )
}

pub fn format_value(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        format!("{:.0}", n)
    }
}

/// [`format_value`] with Arabic-Indic digits when the text runs right to left.
pub fn format_value_localized(n: f64, dir: Directionality) -> String {
    let plain = format_value(n);
    if !dir.is_rtl() {
        return plain;
    }
    plain
        .chars()
        .map(|ch| match ch {
            '0'..='9' => char::from_u32(0x0660 + (ch as u32 - '0' as u32)).unwrap_or(ch),
            '.' => '\u{066B}',
            other => other,
        })
        .collect()
}

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
