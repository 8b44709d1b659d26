//! Pixel size of a rendered asset, read from its bytes.

use chartpress_core::svg::parse_svg_viewbox;
use chartpress_render::MimeType;

/// `(width, height)` of an image, if it can be determined.
pub fn probe(bytes: &[u8], mime_type: MimeType) -> Option<(u32, u32)> {
    match mime_type {
        MimeType::Svg => std::str::from_utf8(bytes).ok().and_then(svg_size),
        MimeType::Png | MimeType::Jpeg => raster_size(bytes),
    }
}

fn raster_size(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Root `width`/`height` attributes in user units, falling back to the `viewBox`.
pub fn svg_size(svg: &str) -> Option<(u32, u32)> {
    let start = svg.find("<svg")?;
    let end = start + svg[start..].find('>')?;
    let tag = &svg[start..end];

    let width = attr(tag, "width").and_then(parse_length);
    let height = attr(tag, "height").and_then(parse_length);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w, h));
    }

    let vb = parse_svg_viewbox(tag)?;
    Some((to_pixels(vb.width)?, to_pixels(vb.height)?))
}

fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;
    loop {
        let i = rest.find(name)?;
        let before = rest[..i].chars().next_back();
        let after = &rest[i + name.len()..];
        rest = after;
        if !before.is_some_and(char::is_whitespace) {
            continue;
        }
        let Some(after) = after.trim_start().strip_prefix('=') else {
            continue;
        };
        let after = after.trim_start();
        let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &after[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
}

/// Plain numbers and `px` lengths only; percentages and other units are not sizes.
fn parse_length(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    to_pixels(raw.trim().parse::<f32>().ok()?)
}

fn to_pixels(v: f32) -> Option<u32> {
    (v.is_finite() && v > 0.0).then(|| v.round().max(1.0) as u32)
}
