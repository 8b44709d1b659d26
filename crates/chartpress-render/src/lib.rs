#![forbid(unsafe_code)]

//! Render backends that turn a [`ChartSet`](chartpress_core::ChartSet) into images.
//!
//! Every backend returns exactly one [`RenderedAsset`] per chart. A chart that fails to render
//! is replaced by a placeholder instead of failing the batch.

pub mod backend;
pub mod canvas;
pub mod config;
pub mod embedded;
pub mod error;
pub mod external;
pub mod placeholder;
pub mod postprocess;

pub use backend::{MimeType, RenderBackend, RenderedAsset, RenderedBatch};
pub use canvas::CanvasBackend;
pub use config::{
    BackendKind, ExternalOutput, ExternalToolConfig, Quality, RasterFormat, RenderConfig,
    ThemeConfig,
};
pub use embedded::{EmbeddedBackend, SvgEngine};
pub use error::{RenderError, Result};
pub use external::ExternalProcessBackend;

/// Builds the backend named by `config.backend`.
///
/// Fails only when the backend was compiled out; nothing is probed at runtime.
pub fn build_backend(config: RenderConfig) -> Result<Box<dyn RenderBackend>> {
    let backend: Box<dyn RenderBackend> = match config.backend {
        BackendKind::External => Box::new(ExternalProcessBackend::new(config)),
        BackendKind::Embedded => embedded_backend(config)?,
        BackendKind::Canvas => canvas_backend(config)?,
    };
    tracing::debug!(backend = backend.kind().as_str(), "selected render backend");
    Ok(backend)
}

#[cfg(feature = "embedded")]
fn embedded_backend(config: RenderConfig) -> Result<Box<dyn RenderBackend>> {
    Ok(Box::new(EmbeddedBackend::mermaid(config)))
}

#[cfg(not(feature = "embedded"))]
fn embedded_backend(_config: RenderConfig) -> Result<Box<dyn RenderBackend>> {
    Err(RenderError::BackendUnavailable {
        backend: BackendKind::Embedded.as_str(),
        feature: "embedded",
    })
}

#[cfg(all(feature = "embedded", feature = "canvas"))]
fn canvas_backend(config: RenderConfig) -> Result<Box<dyn RenderBackend>> {
    Ok(Box::new(CanvasBackend::mermaid(config)))
}

#[cfg(not(all(feature = "embedded", feature = "canvas")))]
fn canvas_backend(_config: RenderConfig) -> Result<Box<dyn RenderBackend>> {
    Err(RenderError::BackendUnavailable {
        backend: BackendKind::Canvas.as_str(),
        feature: if cfg!(feature = "canvas") {
            "embedded"
        } else {
            "canvas"
        },
    })
}
