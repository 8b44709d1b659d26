use crate::config::BackendKind;
use crate::error::RenderError;
use chartpress_core::{ChartItem, ChartSet};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MimeType {
    #[serde(rename = "image/svg+xml")]
    Svg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output for one chart: a genuine render or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAsset {
    /// Extraction name of the chart this asset was rendered from.
    pub name: String,
    /// File name to upload under. Differs from `name` only in extension, for raster output.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: MimeType,
    pub is_placeholder: bool,
}

impl RenderedAsset {
    pub fn new(item: &ChartItem, file_name: String, bytes: Vec<u8>, mime_type: MimeType) -> Self {
        Self {
            name: item.name.clone(),
            file_name,
            bytes,
            mime_type,
            is_placeholder: false,
        }
    }
}

/// Rendered assets keyed by chart name; always one entry per input chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBatch {
    assets: BTreeMap<String, RenderedAsset>,
}

impl RenderedBatch {
    pub fn get(&self, name: &str) -> Option<&RenderedAsset> {
        self.assets.get(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedAsset> {
        self.assets.values()
    }

    pub fn placeholder_count(&self) -> usize {
        self.assets.values().filter(|a| a.is_placeholder).count()
    }

    /// Adds `asset`, replacing any earlier asset for the same chart.
    pub fn insert(&mut self, asset: RenderedAsset) -> Option<RenderedAsset> {
        self.assets.insert(asset.name.clone(), asset)
    }
}

impl FromIterator<RenderedAsset> for RenderedBatch {
    fn from_iter<I: IntoIterator<Item = RenderedAsset>>(iter: I) -> Self {
        let mut batch = Self::default();
        for asset in iter {
            batch.insert(asset);
        }
        batch
    }
}

impl IntoIterator for RenderedBatch {
    type Item = RenderedAsset;
    type IntoIter = std::collections::btree_map::IntoValues<String, RenderedAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.into_values()
    }
}

/// Converts a set of charts into images.
///
/// Implementations own their whole resource lifecycle (scratch files, surfaces) and must return
/// exactly one asset per input chart, substituting a placeholder for any chart that fails.
pub trait RenderBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn render(&self, items: &ChartSet) -> RenderedBatch;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &B {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn render(&self, items: &ChartSet) -> RenderedBatch {
        (**self).render(items)
    }
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn render(&self, items: &ChartSet) -> RenderedBatch {
        (**self).render(items)
    }
}

/// Renders every item in isolation: an error for one item becomes that item's placeholder and
/// the loop moves on.
pub(crate) fn render_isolated(
    kind: BackendKind,
    items: &ChartSet,
    mut render_one: impl FnMut(&ChartItem) -> Result<RenderedAsset, RenderError>,
    placeholder: impl Fn(&ChartItem) -> RenderedAsset,
) -> RenderedBatch {
    let mut batch = RenderedBatch::default();
    for item in items {
        let asset = match render_one(item) {
            Ok(asset) => {
                tracing::debug!(
                    backend = kind.as_str(),
                    name = %item.name,
                    bytes = asset.bytes.len(),
                    "rendered chart"
                );
                asset
            }
            Err(err) => {
                tracing::warn!(
                    backend = kind.as_str(),
                    name = %item.name,
                    error = %err,
                    "chart failed to render; substituting placeholder"
                );
                placeholder(item)
            }
        };
        debug_assert_eq!(asset.name, item.name);
        batch.insert(asset);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::svg_placeholder;

    #[test]
    fn isolation_keeps_going_after_a_failure() {
        let items: ChartSet = ["a", "b", "c"].into_iter().map(ChartItem::new).collect();
        let failing = ChartItem::new("b").name;
        let batch = render_isolated(
            BackendKind::Embedded,
            &items,
            |item| {
                if item.name == failing {
                    Err(RenderError::Engine("boom".to_string()))
                } else {
                    Ok(RenderedAsset::new(
                        item,
                        item.name.clone(),
                        b"<svg/>".to_vec(),
                        MimeType::Svg,
                    ))
                }
            },
            svg_placeholder,
        );
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.placeholder_count(), 1);
        assert!(batch.get(&failing).unwrap().is_placeholder);
        assert!(items.names().eq(batch.names()));
    }
}
