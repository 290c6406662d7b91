use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreemapConfig {
    pub min_label_width: f64,
    pub min_label_height: f64,
    pub label_font_size: f64,
    pub value_font_size: f64,
    pub label_line_gap: f64,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            min_label_width: 60.0,
            min_label_height: 30.0,
            label_font_size: 12.0,
            value_font_size: 11.0,
            label_line_gap: 4.0,
        }
    }
}

/// How heatmap intensities are normalized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum HeatmapNormalization {
    #[default]
    Global,
    PerRow,
    PerColumn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    pub margin_left: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub header_max_chars: usize,
    pub header_font_size: f64,
    pub value_font_size: f64,
    pub show_values: bool,
    pub normalization: HeatmapNormalization,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            margin_left: 90.0,
            margin_top: 40.0,
            margin_right: 10.0,
            margin_bottom: 10.0,
            header_max_chars: 10,
            header_font_size: 11.0,
            value_font_size: 11.0,
            show_values: true,
            normalization: HeatmapNormalization::Global,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub node_width: f64,
    pub node_gap: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub label_padding: f64,
    pub label_font_size: f64,
    pub link_opacity: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            node_width: 14.0,
            node_gap: 10.0,
            margin_x: 120.0,
            margin_y: 10.0,
            label_padding: 6.0,
            label_font_size: 11.0,
            link_opacity: 0.45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunburstConfig {
    pub margin: f64,
    pub inner_radius_ratio: f64,
    pub min_label_angle: f64,
    pub label_font_size: f64,
    pub center_font_size: f64,
}

impl Default for SunburstConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            inner_radius_ratio: 0.3,
            min_label_angle: 0.3,
            label_font_size: 11.0,
            center_font_size: 18.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub legend_cap: usize,
    pub treemap: TreemapConfig,
    pub heatmap: HeatmapConfig,
    pub flow: FlowConfig,
    pub sunburst: SunburstConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            legend_cap: 8,
            treemap: TreemapConfig::default(),
            heatmap: HeatmapConfig::default(),
            flow: FlowConfig::default(),
            sunburst: SunburstConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 480.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    label_font_size: Option<NumberOrString>,
    background: Option<String>,
    text_color: Option<String>,
    light_ink: Option<String>,
    dark_ink: Option<String>,
    stroke_color: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TreemapConfigFile {
    min_label_width: Option<f64>,
    min_label_height: Option<f64>,
    label_font_size: Option<f64>,
    value_font_size: Option<f64>,
    label_line_gap: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HeatmapConfigFile {
    margin_left: Option<f64>,
    margin_top: Option<f64>,
    margin_right: Option<f64>,
    margin_bottom: Option<f64>,
    header_max_chars: Option<usize>,
    header_font_size: Option<f64>,
    value_font_size: Option<f64>,
    show_values: Option<bool>,
    normalization: Option<HeatmapNormalization>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FlowConfigFile {
    node_width: Option<f64>,
    node_gap: Option<f64>,
    margin_x: Option<f64>,
    margin_y: Option<f64>,
    label_padding: Option<f64>,
    label_font_size: Option<f64>,
    link_opacity: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SunburstConfigFile {
    margin: Option<f64>,
    inner_radius_ratio: Option<f64>,
    min_label_angle: Option<f64>,
    label_font_size: Option<f64>,
    center_font_size: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    legend_cap: Option<usize>,
    width: Option<f64>,
    height: Option<f64>,
    treemap: Option<TreemapConfigFile>,
    heatmap: Option<HeatmapConfigFile>,
    #[serde(alias = "sankey")]
    flow: Option<FlowConfigFile>,
    sunburst: Option<SunburstConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    log::info!(path = path.display().to_string(); "Loading configuration");
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };
    Ok(apply_config_file(Config::default(), parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "dashboard" | "light" => config.theme = Theme::dashboard(),
            other => log::warn!(theme = other; "Unknown theme name, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.label_font_size.as_ref().and_then(NumberOrString::as_f64) {
            config.theme.label_font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.light_ink {
            config.theme.light_ink = v;
        }
        if let Some(v) = vars.dark_ink {
            config.theme.dark_ink = v;
        }
        if let Some(v) = vars.stroke_color {
            config.theme.stroke_color = v;
        }
        if let Some(v) = vars.palette
            && !v.is_empty()
        {
            config.theme.palette = v;
        }
    }

    if let Some(v) = parsed.legend_cap {
        config.layout.legend_cap = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    if let Some(file) = parsed.treemap {
        let cfg = &mut config.layout.treemap;
        if let Some(v) = file.min_label_width {
            cfg.min_label_width = v;
        }
        if let Some(v) = file.min_label_height {
            cfg.min_label_height = v;
        }
        if let Some(v) = file.label_font_size {
            cfg.label_font_size = v;
        }
        if let Some(v) = file.value_font_size {
            cfg.value_font_size = v;
        }
        if let Some(v) = file.label_line_gap {
            cfg.label_line_gap = v;
        }
    }

    if let Some(file) = parsed.heatmap {
        let cfg = &mut config.layout.heatmap;
        if let Some(v) = file.margin_left {
            cfg.margin_left = v;
        }
        if let Some(v) = file.margin_top {
            cfg.margin_top = v;
        }
        if let Some(v) = file.margin_right {
            cfg.margin_right = v;
        }
        if let Some(v) = file.margin_bottom {
            cfg.margin_bottom = v;
        }
        if let Some(v) = file.header_max_chars {
            cfg.header_max_chars = v;
        }
        if let Some(v) = file.header_font_size {
            cfg.header_font_size = v;
        }
        if let Some(v) = file.value_font_size {
            cfg.value_font_size = v;
        }
        if let Some(v) = file.show_values {
            cfg.show_values = v;
        }
        if let Some(v) = file.normalization {
            cfg.normalization = v;
        }
    }

    if let Some(file) = parsed.flow {
        let cfg = &mut config.layout.flow;
        if let Some(v) = file.node_width {
            cfg.node_width = v;
        }
        if let Some(v) = file.node_gap {
            cfg.node_gap = v;
        }
        if let Some(v) = file.margin_x {
            cfg.margin_x = v;
        }
        if let Some(v) = file.margin_y {
            cfg.margin_y = v;
        }
        if let Some(v) = file.label_padding {
            cfg.label_padding = v;
        }
        if let Some(v) = file.label_font_size {
            cfg.label_font_size = v;
        }
        if let Some(v) = file.link_opacity {
            cfg.link_opacity = v;
        }
    }

    if let Some(file) = parsed.sunburst {
        let cfg = &mut config.layout.sunburst;
        if let Some(v) = file.margin {
            cfg.margin = v;
        }
        if let Some(v) = file.inner_radius_ratio {
            cfg.inner_radius_ratio = v;
        }
        if let Some(v) = file.min_label_angle {
            cfg.min_label_angle = v;
        }
        if let Some(v) = file.label_font_size {
            cfg.label_font_size = v;
        }
        if let Some(v) = file.center_font_size {
            cfg.center_font_size = v;
        }
    }

    config
}
