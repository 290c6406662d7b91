use crate::config::{LayoutConfig, RenderConfig};
use crate::ir::{DiagramKind, DiagramRequest};
use crate::layout::{
    FillRef, Geometry, Ink, LayoutResult, LegendEntry, PrimitiveShape, ShapeRole, TextAnchor,
};
use crate::theme::{Theme, resolve_palette};
use anyhow::Result;
use color::{DynamicColor, Oklab};
use std::path::Path;
use std::str::FromStr;

const LEGEND_HEIGHT: f64 = 28.0;
const LEGEND_SWATCH: f64 = 10.0;
const LEGEND_PADDING: f64 = 12.0;
const LEGEND_CHAR_WIDTH: f64 = 0.6;
const FALLBACK_COLOR: &str = "#888888";
/// Oklab lightness above which a fill takes dark ink.
const LIGHT_FILL_LIGHTNESS: f32 = 0.7;

/// `"<slug>-chart.<ext>"`, the name an exported diagram is saved under.
pub fn export_file_name(kind: DiagramKind, ext: &str) -> String {
    format!("{}-chart.{}", kind.slug(), ext)
}

/// Paints a layout into a standalone SVG document.
///
/// The canvas is the request size; a legend strip is appended below it when
/// the layout has legend entries.
pub fn render_svg(
    result: &LayoutResult,
    request: &DiagramRequest,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let painter = Painter {
        theme,
        palette: resolve_palette(request, theme),
        link_opacity: config.flow.link_opacity,
    };
    let width = sanitize_dimension(request.width);
    let canvas_height = sanitize_dimension(request.height);
    let legend_height = if result.legend.is_empty() {
        0.0
    } else {
        LEGEND_HEIGHT
    };
    let height = canvas_height + legend_height;

    let mut svg = String::new();
    let direction = if request.directionality.is_rtl() {
        " direction=\"rtl\""
    } else {
        ""
    };
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"{direction}>",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for shape in &result.primitives {
        painter.paint(&mut svg, shape);
    }

    if !result.legend.is_empty() {
        painter.legend(&mut svg, &result.legend, width, canvas_height, request);
    }

    svg.push_str("</svg>");
    svg
}

fn sanitize_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

struct Painter<'a> {
    theme: &'a Theme,
    palette: &'a [String],
    link_opacity: f64,
}

impl Painter<'_> {
    fn color(&self, fill: FillRef) -> &str {
        match fill {
            FillRef::Palette(idx) => self.palette_color(idx),
            FillRef::Ink(Ink::Light) => &self.theme.light_ink,
            FillRef::Ink(Ink::Dark) => &self.theme.dark_ink,
            FillRef::Contrast(idx) => {
                if is_light(self.palette_color(idx)) {
                    &self.theme.dark_ink
                } else {
                    &self.theme.light_ink
                }
            }
            FillRef::Text => &self.theme.text_color,
            FillRef::Background => &self.theme.background,
        }
    }

    fn palette_color(&self, idx: usize) -> &str {
        if self.palette.is_empty() {
            return FALLBACK_COLOR;
        }
        &self.palette[idx % self.palette.len()]
    }

    fn paint(&self, svg: &mut String, shape: &PrimitiveShape) {
        let fill = self.color(shape.fill);
        match &shape.geometry {
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => {
                let stroke = match shape.role {
                    ShapeRole::Tile { .. } | ShapeRole::Cell { .. } => format!(
                        " stroke=\"{}\" stroke-width=\"1\"",
                        self.theme.stroke_color
                    ),
                    _ => String::new(),
                };
                svg.push_str(&format!(
                    "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{fill}\"{stroke}/>",
                ));
            }
            Geometry::Arc { d, .. } => {
                svg.push_str(&format!(
                    "<path d=\"{d}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"1\">",
                    self.theme.stroke_color
                ));
                if let Some(label) = &shape.label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
                svg.push_str("</path>");
            }
            Geometry::Path {
                d,
                stroke_width: Some(stroke_width),
            } => {
                svg.push_str(&format!(
                    "<path d=\"{d}\" fill=\"none\" stroke=\"{fill}\" stroke-width=\"{stroke_width:.2}\" stroke-opacity=\"{}\"/>",
                    self.link_opacity
                ));
            }
            Geometry::Path {
                d,
                stroke_width: None,
            } => {
                svg.push_str(&format!("<path d=\"{d}\" fill=\"{fill}\"/>"));
            }
            Geometry::Text {
                x,
                y,
                anchor,
                font_size,
            } => {
                let text = shape.label.as_deref().unwrap_or_default();
                svg.push_str(&text_svg(*x, *y, *anchor, *font_size, fill, &self.theme.font_family, text));
            }
        }
    }

    fn legend(
        &self,
        svg: &mut String,
        entries: &[LegendEntry],
        width: f64,
        top: f64,
        request: &DiagramRequest,
    ) {
        let rtl = request.directionality.is_rtl();
        let font_size = self.theme.label_font_size;
        let center_y = top + LEGEND_HEIGHT / 2.0;
        let mut cursor = if rtl {
            width - LEGEND_PADDING
        } else {
            LEGEND_PADDING
        };

        for entry in entries {
            let text_width = entry.label.chars().count() as f64 * font_size * LEGEND_CHAR_WIDTH;
            let swatch_x = if rtl { cursor - LEGEND_SWATCH } else { cursor };
            if let Some(fill) = entry.fill {
                svg.push_str(&format!(
                    "<rect x=\"{swatch_x:.2}\" y=\"{:.2}\" width=\"{LEGEND_SWATCH}\" height=\"{LEGEND_SWATCH}\" rx=\"2\" fill=\"{}\"/>",
                    center_y - LEGEND_SWATCH / 2.0,
                    self.color(fill)
                ));
            }
            let text_x = if rtl {
                swatch_x - 4.0
            } else {
                swatch_x + LEGEND_SWATCH + 4.0
            };
            svg.push_str(&text_svg(
                text_x,
                center_y + font_size * 0.35,
                TextAnchor::Start,
                font_size,
                &self.theme.text_color,
                &self.theme.font_family,
                &entry.label,
            ));
            let advance = LEGEND_SWATCH + 4.0 + text_width + LEGEND_PADDING;
            if rtl {
                cursor -= advance;
            } else {
                cursor += advance;
            }
        }
    }
}

/// `Start`/`End` are logical anchors; the root `direction` attribute flips
/// them under right-to-left text.
fn text_svg(
    x: f64,
    y: f64,
    anchor: TextAnchor,
    font_size: f64,
    fill: &str,
    font_family: &str,
    text: &str,
) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{fill}\">{}</text>",
        anchor.as_svg(),
        escape_xml(font_family),
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            log::info!(path = path.display().to_string(); "Wrote SVG");
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("sans-serif")
        .to_string();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    log::info!(path = output.display().to_string(); "Wrote PNG");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

/// Unparseable colors count as dark.
fn is_light(color: &str) -> bool {
    DynamicColor::from_str(color)
        .map(|c| c.to_alpha_color::<Oklab>().components[0] > LIGHT_FILL_LIGHTNESS)
        .unwrap_or(false)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
