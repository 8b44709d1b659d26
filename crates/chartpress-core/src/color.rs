//! Colour normalization for downstream renderers that only understand literal hex colours.
//!
//! Only three places are rewritten: the text of `<style>` elements, `style="..."` attribute
//! values and `fill`/`stroke` attribute values. Text content is never touched, so a label that
//! reads `rgb(1, 2, 3)` survives.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Fallback colour for `currentColor` and CSS-wide keywords on paint properties.
pub const FALLBACK_COLOR: &str = "#000000";
/// Fallback for CSS-wide keywords on `stroke-width`.
pub const FALLBACK_STROKE_WIDTH: &str = "1px";
/// Number of bytes before an `initial` keyword inspected to guess its property.
pub const INITIAL_LOOKBEHIND: usize = 24;

fn style_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").expect("valid regex")
    })
}

fn style_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(\sstyle\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn paint_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(\s(fill|stroke)\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn color_function_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(hsla?|rgba?)\(([^()]*)\)").expect("valid regex"))
}

fn current_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bcurrentcolor\b").expect("valid regex"))
}

fn revert_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(stroke-width|stroke|fill)(\s*:\s*)revert\b").expect("valid regex")
    })
}

fn initial_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\binitial\b").expect("valid regex"))
}

fn property_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(stroke-width|stroke|fill)").expect("valid regex"))
}

/// Rewrites colour functions and CSS-wide keywords inside styling contexts of `markup`.
pub fn normalize_colors(markup: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(markup);

    if style_element_regex().is_match(&out) {
        let replaced = style_element_regex()
            .replace_all(&out, |caps: &Captures<'_>| {
                format!("{}{}{}", &caps[1], normalize_css(&caps[2]), &caps[3])
            })
            .into_owned();
        out = Cow::Owned(replaced);
    }

    if style_attr_regex().is_match(&out) {
        let replaced = style_attr_regex()
            .replace_all(&out, |caps: &Captures<'_>| {
                let (value, quote) = quoted_value(caps, 2, 3);
                format!("{}{quote}{}{quote}", &caps[1], normalize_css(value))
            })
            .into_owned();
        out = Cow::Owned(replaced);
    }

    if paint_attr_regex().is_match(&out) {
        let replaced = paint_attr_regex()
            .replace_all(&out, |caps: &Captures<'_>| {
                let (value, quote) = quoted_value(caps, 3, 4);
                format!(
                    "{}{quote}{}{quote}",
                    &caps[1],
                    normalize_paint_value(&caps[2], value)
                )
            })
            .into_owned();
        out = Cow::Owned(replaced);
    }

    out
}

fn quoted_value<'t>(caps: &Captures<'t>, double: usize, single: usize) -> (&'t str, char) {
    match (caps.get(double), caps.get(single)) {
        (Some(m), _) => (m.as_str(), '"'),
        (None, Some(m)) => (m.as_str(), '\''),
        (None, None) => ("", '"'),
    }
}

/// Normalizes a block of CSS declarations (a stylesheet or a `style` attribute value).
pub fn normalize_css(css: &str) -> String {
    let css = replace_color_functions(css);
    let css = current_color_regex().replace_all(&css, FALLBACK_COLOR);
    let css = revert_regex().replace_all(&css, |caps: &Captures<'_>| {
        format!("{}{}{}", &caps[1], &caps[2], keyword_fallback(&caps[1]))
    });
    resolve_initial(&css)
}

/// Normalizes the value of a `fill` or `stroke` presentation attribute.
fn normalize_paint_value(property: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("revert") || trimmed.eq_ignore_ascii_case("initial") {
        return keyword_fallback(property).to_string();
    }
    let value = replace_color_functions(value);
    current_color_regex()
        .replace_all(&value, FALLBACK_COLOR)
        .into_owned()
}

fn keyword_fallback(property: &str) -> &'static str {
    if property.eq_ignore_ascii_case("stroke-width") {
        FALLBACK_STROKE_WIDTH
    } else {
        FALLBACK_COLOR
    }
}

/// Guesses the property an `initial` keyword belongs to by looking at the text just before it.
///
/// This is a text heuristic, not a CSS parse. Every guess is logged so a surprising fallback can
/// be traced back to its input; keywords with no recognizable property nearby are left alone.
fn resolve_initial(css: &str) -> String {
    initial_regex()
        .replace_all(css, |caps: &Captures<'_>| {
            let Some(m) = caps.get(0) else {
                return String::new();
            };
            let mut from = m.start().saturating_sub(INITIAL_LOOKBEHIND);
            while !css.is_char_boundary(from) {
                from += 1;
            }
            let window = &css[from..m.start()];
            match property_name_regex().find_iter(window).last() {
                Some(property) => {
                    let fallback = keyword_fallback(property.as_str());
                    tracing::warn!(
                        property = property.as_str(),
                        fallback,
                        context = window,
                        "resolved `initial` from preceding text"
                    );
                    fallback.to_string()
                }
                None => m.as_str().to_string(),
            }
        })
        .into_owned()
}

fn replace_color_functions(text: &str) -> Cow<'_, str> {
    color_function_regex().replace_all(text, |caps: &Captures<'_>| {
        let function = caps[1].to_ascii_lowercase();
        let args: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        let hex = match (function.as_str(), args.as_slice()) {
            ("hsl", [h, s, l]) | ("hsla", [h, s, l, _]) => hsl_args_to_hex(h, s, l),
            ("rgb", [r, g, b]) | ("rgba", [r, g, b, _]) => rgb_args_to_hex(r, g, b),
            _ => None,
        };
        let alpha_ok = match args.as_slice() {
            [_, _, _, alpha] => parse_alpha(alpha).is_some(),
            _ => true,
        };
        match hex {
            Some(hex) if alpha_ok => hex,
            _ => caps[0].to_string(),
        }
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn parse_percent(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    parse_number(raw.strip_suffix('%').unwrap_or(raw))
}

fn parse_alpha(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.strip_suffix('%') {
        Some(pct) => parse_number(pct).filter(|v| (0.0..=100.0).contains(v)),
        None => parse_number(raw).filter(|v| (0.0..=1.0).contains(v)),
    }
}

fn hsl_args_to_hex(h: &str, s: &str, l: &str) -> Option<String> {
    let h = h.trim();
    let h = parse_number(h.strip_suffix("deg").unwrap_or(h))?;
    let s = parse_percent(s)?;
    let l = parse_percent(l)?;
    hsl_to_hex(h, s, l)
}

fn rgb_args_to_hex(r: &str, g: &str, b: &str) -> Option<String> {
    let channel = |raw: &str| {
        parse_number(raw)
            .filter(|v| (0.0..=255.0).contains(v))
            .map(|v| v.round() as u8)
    };
    Some(rgb_to_hex(channel(r)?, channel(g)?, channel(b)?))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Converts HSL (hue in degrees, saturation and lightness in percent) to `#rrggbb`.
///
/// Returns `None` when a component is outside `[0, 360]` / `[0, 100]`.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> Option<String> {
    if !(0.0..=360.0).contains(&h) || !(0.0..=100.0).contains(&s) || !(0.0..=100.0).contains(&l) {
        return None;
    }
    let s = s / 100.0;
    let l = l / 100.0;
    let a = s * l.min(1.0 - l);
    let channel = |n: f64| {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let f = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * f).round().clamp(0.0, 255.0) as u8
    };
    Some(rgb_to_hex(channel(0.0), channel(8.0), channel(4.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn css(input: &str) -> String {
        normalize_css(input)
    }

    #[test]
    fn hsl_math() {
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0).as_deref(), Some("#00ff00"));
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0).as_deref(), Some("#ff0000"));
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0).as_deref(), Some("#0000ff"));
        assert_eq!(hsl_to_hex(0.0, 0.0, 100.0).as_deref(), Some("#ffffff"));
        assert_eq!(hsl_to_hex(360.0, 100.0, 50.0).as_deref(), Some("#ff0000"));
        assert_eq!(hsl_to_hex(361.0, 100.0, 50.0), None);
        assert_eq!(hsl_to_hex(10.0, 101.0, 50.0), None);
    }

    #[test]
    fn color_functions_in_css() {
        assert_eq!(css("fill: hsl(120, 100%, 50%);"), "fill: #00ff00;");
        assert_eq!(css("fill:rgb(255,0,0)"), "fill:#ff0000");
        assert_eq!(css("stroke: rgba(0, 0, 255, 0.5)"), "stroke: #0000ff");
        assert_eq!(css("fill: HSL(240deg, 100%, 50%)"), "fill: #0000ff");
    }

    #[test]
    fn out_of_range_functions_stay_literal() {
        assert_eq!(css("fill: rgb(300,0,0)"), "fill: rgb(300,0,0)");
        assert_eq!(css("fill: hsl(400, 50%, 50%)"), "fill: hsl(400, 50%, 50%)");
        assert_eq!(css("fill: rgba(0,0,0,2)"), "fill: rgba(0,0,0,2)");
        assert_eq!(css("fill: rgb(1,2)"), "fill: rgb(1,2)");
        assert_eq!(css("fill: rgb(var(--x), 0, 0)"), "fill: rgb(var(--x), 0, 0)");
    }

    #[test]
    fn keywords() {
        assert_eq!(css("color: currentColor"), "color: #000000");
        assert_eq!(
            css("stroke: revert; stroke-width: revert; fill: revert"),
            "stroke: #000000; stroke-width: 1px; fill: #000000"
        );
        assert_eq!(css("stroke-width: initial"), "stroke-width: 1px");
        assert_eq!(css(".a { fill: initial }"), ".a { fill: #000000 }");
    }

    #[test]
    fn initial_without_nearby_property_is_kept() {
        assert_eq!(css("font-weight: initial"), "font-weight: initial");
        let far = format!("fill: red; {} opacity: initial", "x".repeat(40));
        assert_eq!(css(&far), far);
    }

    #[test]
    fn only_styling_contexts_are_rewritten() {
        let svg = r#"<svg><style>.n{fill:hsl(120,100%,50%)}</style><rect style="stroke: rgb(255, 0, 0)" fill="rgba(0,0,255,0.25)" stroke='currentColor'/><text>rgb(1,2,3)</text></svg>"#;
        assert_eq!(
            normalize_colors(svg),
            r##"<svg><style>.n{fill:#00ff00}</style><rect style="stroke: #ff0000" fill="#0000ff" stroke='#000000'/><text>rgb(1,2,3)</text></svg>"##
        );
    }

    #[test]
    fn paint_attribute_keywords() {
        assert_eq!(
            normalize_colors(r#"<path fill="revert" stroke="initial"/>"#),
            r##"<path fill="#000000" stroke="#000000"/>"##
        );
    }

    #[test]
    fn untouched_markup_is_borrowed() {
        let svg = r##"<svg><rect fill="#fff"/></svg>"##;
        // Paint attributes exist, so the text is rebuilt, but unchanged.
        assert_eq!(normalize_colors(svg), svg);
        assert!(matches!(normalize_colors("<svg/>"), Cow::Borrowed(_)));
    }
}
