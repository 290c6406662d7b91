use serde::{Deserialize, Serialize};

use crate::ir::{DiagramKind, DiagramRequest};

const DASHBOARD_PALETTE: [&str; 8] = [
    "#0B3954", "#087E8B", "#3C9D9B", "#7FB685", "#BFD7B5", "#F2D0A4", "#E07A5F", "#C81D25",
];

// Sequential, light to dark. Heat cells above 0.5 intensity take light ink.
const HEAT_PALETTE: [&str; 9] = [
    "#F7FBFF", "#DEEBF7", "#C6DBEF", "#9ECAE1", "#6BAED6", "#4292C6", "#2171B5", "#08519C",
    "#08306B",
];

const DARK_PALETTE: [&str; 8] = [
    "#1B2A41", "#24527A", "#2E86AB", "#48B8D0", "#8FD6E1", "#F6C667", "#F08A4B", "#E63946",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub label_font_size: f64,
    pub background: String,
    pub text_color: String,
    pub light_ink: String,
    pub dark_ink: String,
    pub stroke_color: String,
    pub palette: Vec<String>,
    pub heat_palette: Vec<String>,
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            font_family: "Inter, Segoe UI, Tahoma, system-ui, sans-serif".to_string(),
            label_font_size: 11.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            light_ink: "#FFFFFF".to_string(),
            dark_ink: "#1C2430".to_string(),
            stroke_color: "#FFFFFF".to_string(),
            palette: DASHBOARD_PALETTE.iter().map(|c| c.to_string()).collect(),
            heat_palette: HEAT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, Tahoma, system-ui, sans-serif".to_string(),
            label_font_size: 11.0,
            background: "#0F1620".to_string(),
            text_color: "#E6EDF5".to_string(),
            light_ink: "#F8FAFF".to_string(),
            dark_ink: "#0F1620".to_string(),
            stroke_color: "#0F1620".to_string(),
            palette: DARK_PALETTE.iter().map(|c| c.to_string()).collect(),
            heat_palette: HEAT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Palette a request falls back to when it carries none of its own.
    pub fn palette_for(&self, kind: DiagramKind) -> &[String] {
        match kind {
            DiagramKind::HeatGrid => &self.heat_palette,
            _ => &self.palette,
        }
    }
}

/// The request palette when present, otherwise the theme fallback.
pub fn resolve_palette<'a>(request: &'a DiagramRequest, theme: &'a Theme) -> &'a [String] {
    if request.palette.is_empty() {
        theme.palette_for(request.kind)
    } else {
        &request.palette
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}
