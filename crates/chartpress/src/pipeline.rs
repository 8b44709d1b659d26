//! Extract, render, upload, rewrite.

use crate::upload::Uploader;
use chartpress_core::{AssetMap, DocumentNode, UploadedAsset, extract, rewrite_in_place};
use chartpress_render::{RenderBackend, RenderedAsset};
use serde::Serialize;

/// Counters for one publish run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Distinct charts found in the tree.
    pub charts: usize,
    /// Charts that rendered as a placeholder.
    pub placeholders: usize,
    /// Assets the uploader stored.
    pub uploaded: usize,
    /// Assets the uploader declined or failed to store.
    pub skipped: usize,
    /// Diagram blocks replaced in the tree.
    pub rewritten: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub tree: DocumentNode,
    pub report: PublishReport,
}

/// Drives one backend and one uploader over document trees.
///
/// Nothing in a run is fatal: render failures become placeholders and upload failures leave the
/// diagram block in place.
#[derive(Debug, Clone)]
pub struct Publisher<B, U> {
    backend: B,
    uploader: U,
}

impl<B: RenderBackend, U: Uploader> Publisher<B, U> {
    pub fn new(backend: B, uploader: U) -> Self {
        Self { backend, uploader }
    }

    pub fn publish(&self, tree: &DocumentNode) -> PublishOutcome {
        let charts = extract(tree);
        let mut report = PublishReport {
            charts: charts.len(),
            ..Default::default()
        };
        if charts.is_empty() {
            return PublishOutcome {
                tree: tree.clone(),
                report,
            };
        }

        let batch = self.backend.render(&charts);
        report.placeholders = batch.placeholder_count();

        let mut assets = AssetMap::with_capacity(batch.len());
        for asset in batch {
            let uploaded = self.upload(&asset);
            if uploaded.is_some() {
                report.uploaded += 1;
            } else {
                report.skipped += 1;
            }
            assets.insert(asset.name, uploaded);
        }

        let mut out = tree.clone();
        report.rewritten = rewrite_in_place(&mut out, &assets);
        tracing::debug!(
            backend = self.backend.kind().as_str(),
            charts = report.charts,
            placeholders = report.placeholders,
            uploaded = report.uploaded,
            skipped = report.skipped,
            rewritten = report.rewritten,
            "publish run finished"
        );
        PublishOutcome { tree: out, report }
    }

    fn upload(&self, asset: &RenderedAsset) -> Option<UploadedAsset> {
        match self
            .uploader
            .upload(&asset.file_name, &asset.bytes, asset.mime_type)
        {
            Ok(Some(uploaded)) => Some(uploaded),
            Ok(None) => {
                tracing::warn!(name = %asset.name, "uploader returned no asset; keeping diagram block");
                None
            }
            Err(err) => {
                tracing::warn!(name = %asset.name, error = %err, "upload failed; keeping diagram block");
                None
            }
        }
    }
}

/// One-shot helper over [`Publisher`].
pub fn publish(
    tree: &DocumentNode,
    backend: &dyn RenderBackend,
    uploader: &dyn Uploader,
) -> PublishOutcome {
    Publisher::new(backend, uploader).publish(tree)
}
