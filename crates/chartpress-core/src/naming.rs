use sha2::{Digest, Sha256};

/// Prefix shared by every rendered chart file name.
pub const CHART_NAME_PREFIX: &str = "RenderedMermaidChart";
/// Extension assigned at extraction time, before any backend decides on a raster format.
pub const VECTOR_EXTENSION: &str = "svg";
/// Source hashed for diagram blocks that carry no text.
pub const EMPTY_CHART_SOURCE: &str = "flowchart LR\nid1[Missing Chart]";

/// Lowercase hex SHA-256 of `source`.
pub fn content_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Content-addressed file name for a diagram source.
pub fn chart_name(source: &str) -> String {
    format!(
        "{CHART_NAME_PREFIX}-{}.{VECTOR_EXTENSION}",
        content_hash(source)
    )
}

/// Name for a diagram block whose text may be missing.
///
/// Blocks without text are hashed as [`EMPTY_CHART_SOURCE`]. Extraction never produces such a
/// name, so lookups for empty blocks miss and the block stays as authored.
pub fn chart_name_or_placeholder(source: Option<&str>) -> String {
    chart_name(source.unwrap_or(EMPTY_CHART_SOURCE))
}

/// Replaces the extension of `name` (the part after the last `.`) with `extension`.
pub fn rename_extension(name: &str, extension: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    format!("{stem}.{extension}")
}

/// File stem of a chart name (no extension).
pub fn chart_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
