use crate::error::RequestError;
use crate::ir::{DiagramDatum, DiagramKind, DiagramRequest, Directionality};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+)(?:-beta)?\s*$").unwrap());
static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static WEIGHTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<label>"[^"]*"|'[^']*'|[^:]+?)\s*:\s*(?P<rest>.+)$"#).unwrap()
});

/// A parsed request plus the canvas size the source declared itself.
///
/// Undeclared dimensions are left to the caller's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub request: DiagramRequest,
    pub declared_width: Option<f64>,
    pub declared_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitDirective {
    palette: Option<Vec<String>>,
    #[serde(alias = "directionality")]
    direction: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
}

/// Parses either a JSON/JSON5 request object or the line-oriented text form:
///
/// ```text
/// %%{init: {"direction": "rtl"}}%%
/// treemap
///   Riyadh: 60, Central
///   Jeddah: 40
/// ```
pub fn parse_request(input: &str) -> Result<ParseOutput, RequestError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') {
        parse_json_request(trimmed)
    } else {
        parse_text_request(input)
    }
}

fn parse_json_request(input: &str) -> Result<ParseOutput, RequestError> {
    let value: serde_json::Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(_) => json5::from_str(input).map_err(|err| RequestError::InvalidJson(err.to_string()))?,
    };
    let declared_width = value.get("width").and_then(serde_json::Value::as_f64);
    let declared_height = value.get("height").and_then(serde_json::Value::as_f64);
    let request: DiagramRequest =
        serde_json::from_value(value).map_err(|err| RequestError::InvalidJson(err.to_string()))?;
    Ok(ParseOutput {
        request,
        declared_width,
        declared_height,
    })
}

fn parse_text_request(input: &str) -> Result<ParseOutput, RequestError> {
    let mut init = InitDirective::default();
    let mut kind: Option<DiagramKind> = None;
    let mut items = Vec::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed_line) {
            init = parse_init(caps.get(1).map_or("", |m| m.as_str()))?;
            continue;
        }
        if trimmed_line.starts_with("%%") {
            continue;
        }
        let line = strip_trailing_comment(trimmed_line);
        if line.is_empty() {
            continue;
        }
        match kind {
            None => kind = Some(parse_header(&line)?),
            Some(current) => items.push(parse_data_line(current, &line, line_no)?),
        }
    }

    let kind = kind.ok_or(RequestError::Empty)?;
    let mut request = DiagramRequest::new(kind, items);
    if let Some(palette) = init.palette {
        request.palette = palette;
    }
    if let Some(direction) = init.direction.as_deref() {
        request.directionality = Directionality::from_token(direction.trim())
            .ok_or_else(|| RequestError::InvalidInit(format!("unknown direction `{direction}`")))?;
    }
    if let Some(width) = init.width {
        request.width = width;
    }
    if let Some(height) = init.height {
        request.height = height;
    }
    Ok(ParseOutput {
        request,
        declared_width: init.width,
        declared_height: init.height,
    })
}

fn parse_init(json_str: &str) -> Result<InitDirective, RequestError> {
    match serde_json::from_str::<InitDirective>(json_str) {
        Ok(init) => Ok(init),
        Err(_) => json5::from_str::<InitDirective>(json_str)
            .map_err(|err| RequestError::InvalidInit(err.to_string())),
    }
}

fn parse_header(line: &str) -> Result<DiagramKind, RequestError> {
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|token| DiagramKind::from_token(token.as_str()))
        .ok_or_else(|| RequestError::UnknownHeader(line.to_string()))
}

fn parse_data_line(kind: DiagramKind, line: &str, line_no: usize) -> Result<DiagramDatum, RequestError> {
    match kind {
        DiagramKind::AreaTiling | DiagramKind::RadialPartition => {
            let caps = WEIGHTED_RE
                .captures(line)
                .ok_or_else(|| RequestError::invalid_line(line_no, "expected `label: value`"))?;
            let label = strip_quotes(caps.name("label").map_or("", |m| m.as_str()));
            if label.is_empty() {
                return Err(RequestError::invalid_line(line_no, "empty label"));
            }
            let rest = split_args(caps.name("rest").map_or("", |m| m.as_str()));
            let value = parse_value(rest.first().map(String::as_str), line_no)?;
            let mut datum = DiagramDatum::new(label, value);
            if let Some(category) = rest.get(1).map(|c| strip_quotes(c)).filter(|c| !c.is_empty()) {
                datum = datum.with_category(category);
            }
            Ok(datum)
        }
        DiagramKind::HeatGrid => {
            let [row, col, value] = three_fields(line, line_no, "expected `row, column, value`")?;
            Ok(DiagramDatum::cell(row, col, parse_value(Some(value.as_str()), line_no)?))
        }
        DiagramKind::Flow => {
            let [source, target, value] =
                three_fields(line, line_no, "expected `source, target, value`")?;
            Ok(DiagramDatum::edge(
                source,
                target,
                parse_value(Some(value.as_str()), line_no)?,
            ))
        }
    }
}

fn three_fields(line: &str, line_no: usize, expected: &str) -> Result<[String; 3], RequestError> {
    let parts: Vec<String> = split_args(line).iter().map(|p| strip_quotes(p)).collect();
    match <[String; 3]>::try_from(parts) {
        Ok(fields) if fields.iter().all(|f| !f.is_empty()) => Ok(fields),
        _ => Err(RequestError::invalid_line(line_no, expected)),
    }
}

fn parse_value(token: Option<&str>, line_no: usize) -> Result<f64, RequestError> {
    let token = token.map(str::trim).unwrap_or_default();
    token
        .parse::<f64>()
        .map_err(|_| RequestError::invalid_line(line_no, format!("`{token}` is not a number")))
}

fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            current.push(ch);
            continue;
        }
        if ch == ',' {
            args.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() || !args.is_empty() {
        args.push(trimmed.to_string());
    }
    args
}

fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    for q in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(q) && trimmed.ends_with(q) {
            return trimmed[1..trimmed.len() - 1].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Drops a `%%` comment that is not inside quotes.
fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_treemap_lines() {
        let input = "treemap\n  Riyadh: 60, Central\n  \"Jeddah: West\": 40\n";
        let parsed = parse_request(input).unwrap();
        let request = parsed.request;
        assert_eq!(request.kind, DiagramKind::AreaTiling);
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0], DiagramDatum::new("Riyadh", 60.0).with_category("Central"));
        assert_eq!(request.items[1].name, "Jeddah: West");
        assert_eq!(parsed.declared_width, None);
    }

    #[test]
    fn parses_heatmap_and_sankey_rows() {
        let heat = parse_request("heatmap\nRiyadh, Jan, 12\nRiyadh, Feb, 7").unwrap();
        assert_eq!(heat.request.items[1], DiagramDatum::cell("Riyadh", "Feb", 7.0));

        let flow = parse_request("sankey-beta\n\"Open, pending\", Closed, 3.5").unwrap();
        assert_eq!(flow.request.kind, DiagramKind::Flow);
        assert_eq!(
            flow.request.items[0],
            DiagramDatum::edge("Open, pending", "Closed", 3.5)
        );
    }

    #[test]
    fn init_directive_sets_request_fields() {
        let input = "%%{init: {'direction': 'rtl', 'palette': ['#111', '#222'], 'width': 640}}%%\nsunburst\nA: 1";
        let parsed = parse_request(input).unwrap();
        assert!(parsed.request.directionality.is_rtl());
        assert_eq!(parsed.request.palette, vec!["#111", "#222"]);
        assert_eq!(parsed.request.width, 640.0);
        assert_eq!(parsed.declared_width, Some(640.0));
        assert_eq!(parsed.declared_height, None);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "%% leading comment\n\nradial\nA: 1 %% trailing\n\nB: 2\n";
        let parsed = parse_request(input).unwrap();
        assert_eq!(parsed.request.kind, DiagramKind::RadialPartition);
        assert_eq!(parsed.request.items.len(), 2);
    }

    #[test]
    fn reports_errors_with_line_numbers() {
        assert_eq!(
            parse_request("pie\nA: 1"),
            Err(RequestError::UnknownHeader("pie".to_string()))
        );
        assert_eq!(parse_request("  \n%% only a comment"), Err(RequestError::Empty));
        assert!(matches!(
            parse_request("treemap\nA: 1\nB: lots"),
            Err(RequestError::InvalidLine { line: 3, .. })
        ));
        assert!(matches!(
            parse_request("heatmap\nRiyadh, 4"),
            Err(RequestError::InvalidLine { line: 2, .. })
        ));
        assert!(matches!(
            parse_request("%%{init: {\"direction\": \"up\"}}%%\ntreemap"),
            Err(RequestError::InvalidInit(_))
        ));
    }

    #[test]
    fn json_payload_is_accepted() {
        let input = r#"{"kind": "flow", "height": 300, "items": [{"name": "x", "source": "A", "target": "B", "value": 2}]}"#;
        let parsed = parse_request(input).unwrap();
        assert_eq!(parsed.request.kind, DiagramKind::Flow);
        assert_eq!(parsed.declared_height, Some(300.0));
        assert_eq!(parsed.declared_width, None);
        assert_eq!(parsed.request.items[0].source_key(), Some("A"));
    }

    #[test]
    fn json5_payload_is_accepted() {
        let parsed = parse_request("{kind: 'heatGrid', items: [], }").unwrap();
        assert_eq!(parsed.request.kind, DiagramKind::HeatGrid);
        assert!(matches!(
            parse_request("{kind: 'donut'}"),
            Err(RequestError::InvalidJson(_))
        ));
    }
}
