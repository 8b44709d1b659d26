use std::borrow::Cow;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Returns `svg` prefixed with the XML declaration unless it already starts with one.
pub fn ensure_xml_declaration(svg: &str) -> Cow<'_, str> {
    if svg.trim_start().starts_with("<?xml") {
        Cow::Borrowed(svg)
    } else {
        Cow::Owned(format!("{XML_DECLARATION}\n{svg}"))
    }
}

pub fn escape_xml_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Fixed 400x100 image substituted for a chart that failed to render.
pub fn error_placeholder_svg(name: &str) -> String {
    format!(
        r##"{XML_DECLARATION}
<svg xmlns="http://www.w3.org/2000/svg" width="400" height="100" viewBox="0 0 400 100"><rect x="1" y="1" width="398" height="98" fill="#ffeeee" stroke="#ff0000" stroke-width="2"/><text x="200" y="50" text-anchor="middle" dominant-baseline="middle" font-family="Arial, sans-serif" font-size="14" fill="#cc0000">Error rendering chart: {}</text></svg>"##,
        escape_xml_text(name)
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Cheap, non-validating parse of the first `viewBox="minX minY w h"` attribute.
pub fn parse_svg_viewbox(svg: &str) -> Option<ViewBox> {
    let i = svg.find("viewBox=\"")?;
    let rest = &svg[i + "viewBox=\"".len()..];
    let end = rest.find('"')?;
    let mut it = rest[..end]
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let min_x = it.next()?.parse::<f32>().ok()?;
    let min_y = it.next()?.parse::<f32>().ok()?;
    let width = it.next()?.parse::<f32>().ok()?;
    let height = it.next()?.parse::<f32>().ok()?;
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Some(ViewBox {
            min_x,
            min_y,
            width,
            height,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_is_added_once() {
        let svg = "<svg/>";
        let with = ensure_xml_declaration(svg);
        assert!(with.starts_with(XML_DECLARATION));
        assert_eq!(ensure_xml_declaration(&with), with);
    }

    #[test]
    fn placeholder_is_well_formed() {
        let svg = error_placeholder_svg("RenderedMermaidChart-<x>.svg");
        assert!(svg.starts_with(XML_DECLARATION));
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("width"), Some("400"));
        assert_eq!(root.attribute("height"), Some("100"));
        let text = root
            .descendants()
            .find(|n| n.has_tag_name("text"))
            .and_then(|n| n.text())
            .unwrap();
        assert_eq!(text, "Error rendering chart: RenderedMermaidChart-<x>.svg");
    }

    #[test]
    fn viewbox_parsing() {
        let vb = parse_svg_viewbox(r#"<svg viewBox="-8 -8 120.5 60">"#).unwrap();
        assert_eq!((vb.min_x, vb.width, vb.height), (-8.0, 120.5, 60.0));
        assert_eq!(parse_svg_viewbox(r#"<svg viewBox="0 0 0 10">"#), None);
        assert_eq!(parse_svg_viewbox("<svg>"), None);
    }
}
