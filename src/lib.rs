#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::RequestError;
pub use ir::{DiagramDatum, DiagramKind, DiagramRequest, Directionality};
pub use layout::{LayoutInput, LayoutResult, PrimitiveShape, compute_layout};
pub use parser::parse_request;
pub use render::{export_file_name, render_svg};
pub use theme::Theme;

/// Options for the one-call [`render_with_options`] entry point.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    /// Overrides both the source's declared size and the configured size.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Renders text or JSON source to SVG with default options.
pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_options(input, &RenderOptions::default())
}

pub fn render_with_options(input: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let parsed = parse_request(input)?;
    let mut request = parsed.request;
    request.width = options
        .width
        .or(parsed.declared_width)
        .unwrap_or(options.config.render.width);
    request.height = options
        .height
        .or(parsed.declared_height)
        .unwrap_or(options.config.render.height);

    let config = &options.config;
    let result = compute_layout(&request, &config.theme, &config.layout);
    Ok(render_svg(&result, &request, &config.theme, &config.layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_uses_configured_size_unless_declared() {
        let svg = render("treemap\nA: 3\nB: 1").unwrap();
        assert!(svg.contains("viewBox=\"0 0 720 508\""));

        let svg = render("%%{init: {\"width\": 300, \"height\": 200}}%%\nsunburst\nA: 1").unwrap();
        assert!(svg.contains("viewBox=\"0 0 300 228\""));

        let options = RenderOptions {
            width: Some(100.0),
            ..Default::default()
        };
        let svg = render_with_options("heatmap\nr, c, 1", &options).unwrap();
        assert!(svg.contains("width=\"100\""));
    }

    #[test]
    fn render_propagates_parse_errors() {
        let err = render("gantt\nA: 1").unwrap_err();
        assert!(err.downcast_ref::<RequestError>().is_some());
    }
}
