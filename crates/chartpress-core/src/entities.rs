use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Named and well-known numeric references resolved by [`decode_entities`].
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("lt", '<'),
    ("gt", '>'),
    ("amp", '&'),
    ("quot", '"'),
    ("apos", '\''),
    ("#39", '\''),
    ("#x27", '\''),
    ("#x2F", '/'),
    ("#x60", '`'),
    ("#x3D", '='),
    ("nbsp", '\u{00A0}'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("euro", '€'),
    ("pound", '£'),
    ("yen", '¥'),
    ("cent", '¢'),
];

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,15});")
            .expect("valid regex")
    })
}

fn decode_reference(reference: &str) -> Option<char> {
    if let Some((_, ch)) = NAMED_ENTITIES.iter().find(|(name, _)| *name == reference) {
        return Some(*ch);
    }
    let num = reference.strip_prefix('#')?;
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Resolves character references to literal characters in a single left-to-right pass.
///
/// The named table is consulted first, then decimal `&#NNN;`, then hex `&#xHH;`. Output of a
/// replacement is never rescanned, so `&amp;lt;` becomes `&lt;` and stops there. Unknown names
/// and invalid code points are kept verbatim.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    entity_regex().replace_all(input, |caps: &Captures<'_>| match decode_reference(&caps[1]) {
        Some(ch) => ch.to_string(),
        None => caps[0].to_string(),
    })
}
