use crate::config::{Config, load_config};
use crate::ir::DiagramRequest;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_request;
use crate::render::{export_file_name, render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ddr", version, about = "Dashboard diagram renderer: treemap, heatmap, sankey and sunburst")]
pub struct Args {
    /// Input file (text directive or JSON request) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file or directory. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables and per-layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width; overrides the input and config file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height; overrides the input and config file
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_request(&input)?;
    let mut request = parsed.request;
    request.width = args.width.or(parsed.declared_width).unwrap_or(config.render.width);
    request.height = args
        .height
        .or(parsed.declared_height)
        .unwrap_or(config.render.height);
    log::debug!(kind = request.kind.slug(), items = request.items.len(); "Parsed request");

    let result = compute_layout(&request, &config.theme, &config.layout);
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &result, &request)?;
    }

    let svg = render_svg(&result, &request, &config.theme, &config.layout);
    let output = resolve_output(args.output.as_deref(), &request, args.output_format);
    write_output(&svg, output.as_deref(), args.output_format, &config)
}

fn write_output(svg: &str, output: Option<&Path>, format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Svg => write_output_svg(svg, output),
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_output_png(svg, output, &config.render, &config.theme)
        }
    }
}

/// A directory output gets the exported file name for the request kind.
fn resolve_output(output: Option<&Path>, request: &DiagramRequest, format: OutputFormat) -> Option<PathBuf> {
    let path = output?;
    if path.is_dir() {
        return Some(path.join(export_file_name(request.kind, format.extension())));
    }
    Some(path.to_path_buf())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        log::info!(path = path.display().to_string(); "Reading input");
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DiagramKind;

    #[test]
    fn args_parse_long_and_short_flags() {
        let args = Args::parse_from([
            "ddr",
            "-i",
            "in.chart",
            "-e",
            "png",
            "-w",
            "640",
            "--dumpLayout",
            "layout.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.input.as_deref(), Some(Path::new("in.chart")));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert_eq!(args.width, Some(640.0));
        assert_eq!(args.height, None);
        assert_eq!(args.dump_layout.as_deref(), Some(Path::new("layout.json")));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn directory_output_uses_export_name() {
        let dir = std::env::temp_dir();
        let request = DiagramRequest::new(DiagramKind::HeatGrid, Vec::new());
        let resolved = resolve_output(Some(&dir), &request, OutputFormat::Svg);
        assert_eq!(resolved, Some(dir.join("heatmap-chart.svg")));
        assert_eq!(resolve_output(None, &request, OutputFormat::Svg), None);
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_keeps_the_svg_size_including_legend() {
        let config = Config::default();
        let svg = crate::render("treemap\nA: 3\nB: 1").unwrap();
        let path = std::env::temp_dir().join(format!("ddr-legend-{}.png", std::process::id()));
        write_output(&svg, Some(&path), OutputFormat::Png, &config).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        // IHDR width and height, big-endian, right after the signature.
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert_eq!((width, height), (720, 508));
    }

    #[test]
    fn png_requires_an_output_path() {
        let svg = crate::render("treemap\nA: 1").unwrap();
        assert!(write_output(&svg, None, OutputFormat::Png, &Config::default()).is_err());
    }
}
