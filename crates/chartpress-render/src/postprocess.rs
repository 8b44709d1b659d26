use chartpress_core::svg::ensure_xml_declaration;
use chartpress_core::{decode_entities, normalize_colors};

/// Prepares renderer SVG for upload: decode character references, replace colour functions with
/// hex, then make sure the document opens with an XML declaration. The order matters: colour
/// normalization must see literal text.
pub fn finalize_svg(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let normalized = normalize_colors(&decoded);
    ensure_xml_declaration(&normalized).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartpress_core::svg::XML_DECLARATION;

    #[test]
    fn decodes_normalizes_and_declares() {
        let raw = r#"<svg xmlns="http://www.w3.org/2000/svg"><style>.a{fill:hsl(120, 100%, 50%)}</style><text>A&#x26;B</text></svg>"#;
        let out = finalize_svg(raw);
        assert!(out.starts_with(XML_DECLARATION));
        assert!(out.contains(".a{fill:#00ff00}"));
        assert!(out.contains("<text>A&B</text>"));
    }

    #[test]
    fn existing_declaration_is_kept() {
        let raw = "<?xml version=\"1.0\"?><svg/>";
        assert_eq!(finalize_svg(raw), raw);
    }
}
