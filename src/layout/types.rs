use serde::Serialize;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Rect,
    Arc,
    Path,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    /// Mirrors start/end for right-to-left text.
    pub fn for_direction(self, dir: crate::ir::Directionality) -> Self {
        match (self, dir.is_rtl()) {
            (Self::Start, true) => Self::End,
            (Self::End, true) => Self::Start,
            (anchor, _) => anchor,
        }
    }

    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ink {
    Light,
    Dark,
}

/// Color reference resolved by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum FillRef {
    /// Index into the request palette, taken modulo its length.
    Palette(usize),
    Ink(Ink),
    /// Light or dark ink, whichever reads better on the palette color at
    /// this index.
    Contrast(usize),
    /// Theme text color, for labels drawn on the background.
    Text,
    Background,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Geometry {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Arc {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        d: String,
    },
    Path {
        d: String,
        /// Stroked paths use the fill reference as their stroke color.
        stroke_width: Option<f64>,
    },
    Text {
        x: f64,
        y: f64,
        anchor: TextAnchor,
        font_size: f64,
    },
}

impl Geometry {
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Rect { width, height, .. } => width * height,
            _ => 0.0,
        }
    }
}

/// What a primitive depicts. Consumers that only paint can ignore it.
///
/// `item` is the position of the datum in the layout input it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum ShapeRole {
    Tile {
        item: usize,
        value: f64,
    },
    Cell {
        row: usize,
        col: usize,
        value: f64,
        intensity: f64,
    },
    Header,
    FlowNode {
        side: FlowSide,
        name: String,
        total: f64,
        height: f64,
    },
    FlowLink {
        item: usize,
        source: usize,
        target: usize,
        value: f64,
        source_share: f64,
        target_share: f64,
    },
    Wedge {
        item: usize,
        value: f64,
    },
    CenterDisc {
        total: f64,
    },
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowSide {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveShape {
    pub geometry: Geometry,
    pub fill: FillRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub role: ShapeRole,
}

impl PrimitiveShape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: FillRef, role: ShapeRole) -> Self {
        Self {
            geometry: Geometry::Rect {
                x,
                y,
                width,
                height,
            },
            fill,
            label: None,
            role,
        }
    }

    pub fn text(
        x: f64,
        y: f64,
        anchor: TextAnchor,
        font_size: f64,
        text: impl Into<String>,
        fill: FillRef,
    ) -> Self {
        Self {
            geometry: Geometry::Text {
                x,
                y,
                anchor,
                font_size,
            },
            fill,
            label: Some(text.into()),
            role: ShapeRole::Label,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self.geometry {
            Geometry::Rect { .. } => PrimitiveKind::Rect,
            Geometry::Arc { .. } => PrimitiveKind::Arc,
            Geometry::Path { .. } => PrimitiveKind::Path,
            Geometry::Text { .. } => PrimitiveKind::Text,
        }
    }
}

/// One legend key and the fill of the first primitive drawn for it.
///
/// `fill` is `None` when no primitive is colored by the key, e.g. heat
/// cells, whose color follows intensity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    pub primitives: Vec<PrimitiveShape>,
    pub legend: Vec<LegendEntry>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn legend_labels(&self) -> Vec<&str> {
        self.legend.iter().map(|entry| entry.label.as_str()).collect()
    }

    pub fn shapes_of(&self, kind: PrimitiveKind) -> impl Iterator<Item = &PrimitiveShape> {
        self.primitives.iter().filter(move |shape| shape.kind() == kind)
    }
}
