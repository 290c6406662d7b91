use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramKind {
    AreaTiling,
    HeatGrid,
    Flow,
    RadialPartition,
}

impl DiagramKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "treemap" | "areatiling" => Some(Self::AreaTiling),
            "heatmap" | "heatgrid" => Some(Self::HeatGrid),
            "sankey" | "flow" => Some(Self::Flow),
            "sunburst" | "radial" | "radialpartition" => Some(Self::RadialPartition),
            _ => None,
        }
    }

    /// Short name used for exported file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::AreaTiling => "treemap",
            Self::HeatGrid => "heatmap",
            Self::Flow => "sankey",
            Self::RadialPartition => "sunburst",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    #[default]
    Ltr,
    Rtl,
}

impl Directionality {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ltr" => Some(Self::Ltr),
            "rtl" => Some(Self::Rtl),
            _ => None,
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDatum {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiagramDatum>,
}

impl DiagramDatum {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            ..Default::default()
        }
    }

    pub fn edge(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            name: format!("{source} \u{2192} {target}"),
            value,
            source: Some(source),
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn cell(row: impl Into<String>, col: impl Into<String>, value: f64) -> Self {
        let col = col.into();
        Self {
            name: col.clone(),
            value,
            row_key: Some(row.into()),
            col_key: Some(col),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// Label for the given text direction; RTL prefers the localized name.
    pub fn display_name(&self, dir: Directionality) -> &str {
        match (&self.localized_name, dir) {
            (Some(localized), Directionality::Rtl) if !localized.is_empty() => localized,
            _ => &self.name,
        }
    }

    pub fn legend_key(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.name)
    }

    pub fn row(&self) -> Option<&str> {
        non_empty(self.row_key.as_deref()).or_else(|| non_empty(self.category.as_deref()))
    }

    pub fn col(&self) -> Option<&str> {
        non_empty(self.col_key.as_deref()).or_else(|| non_empty(Some(self.name.as_str())))
    }

    pub fn source_key(&self) -> Option<&str> {
        non_empty(self.source.as_deref())
    }

    pub fn target_key(&self) -> Option<&str> {
        non_empty(self.target.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRequest {
    pub kind: DiagramKind,
    #[serde(default)]
    pub items: Vec<DiagramDatum>,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default, alias = "direction")]
    pub directionality: Directionality,
}

fn default_width() -> f64 {
    720.0
}

fn default_height() -> f64 {
    480.0
}

impl DiagramRequest {
    pub fn new(kind: DiagramKind, items: Vec<DiagramDatum>) -> Self {
        Self {
            kind,
            items,
            width: default_width(),
            height: default_height(),
            palette: Vec::new(),
            directionality: Directionality::Ltr,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_directionality(mut self, directionality: Directionality) -> Self {
        self.directionality = directionality;
        self
    }
}
