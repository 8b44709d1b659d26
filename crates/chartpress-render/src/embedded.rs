//! In-process rendering through an embedded diagram library.

use crate::backend::{MimeType, RenderBackend, RenderedAsset, RenderedBatch, render_isolated};
use crate::config::{BackendKind, RenderConfig};
use crate::error::Result;
use crate::placeholder::svg_placeholder;
use crate::postprocess::finalize_svg;
use chartpress_core::{ChartItem, ChartSet};

/// Diagram source to SVG markup, in-process.
pub trait SvgEngine: Send + Sync {
    fn render_svg(&self, source: &str) -> Result<String>;
}

impl<E: SvgEngine + ?Sized> SvgEngine for &E {
    fn render_svg(&self, source: &str) -> Result<String> {
        (**self).render_svg(source)
    }
}

/// [`SvgEngine`] backed by the `mermaid-rs-renderer` crate.
#[cfg(feature = "embedded")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRsEngine;

#[cfg(feature = "embedded")]
impl SvgEngine for MermaidRsEngine {
    fn render_svg(&self, source: &str) -> Result<String> {
        use crate::error::RenderError;

        // The library may panic on malformed input; one chart must not take the batch down.
        let rendered = std::panic::catch_unwind(|| {
            let options = mermaid_rs_renderer::RenderOptions {
                theme: mermaid_rs_renderer::Theme::modern(),
                layout: mermaid_rs_renderer::LayoutConfig::default(),
            };
            mermaid_rs_renderer::render_with_options(source, options)
        });
        match rendered {
            Ok(Ok(svg)) => Ok(svg),
            Ok(Err(err)) => Err(RenderError::Engine(err.to_string())),
            Err(_) => Err(RenderError::Engine("renderer panicked".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddedBackend<E> {
    engine: E,
    config: RenderConfig,
}

#[cfg(feature = "embedded")]
impl EmbeddedBackend<MermaidRsEngine> {
    pub fn mermaid(config: RenderConfig) -> Self {
        Self::new(MermaidRsEngine, config)
    }
}

impl<E: SvgEngine> EmbeddedBackend<E> {
    pub fn new(engine: E, config: RenderConfig) -> Self {
        Self { engine, config }
    }

    fn render_item(&self, item: &ChartItem) -> Result<RenderedAsset> {
        let source = self.config.prepare_source(&item.source_text);
        let svg = self.engine.render_svg(&source)?;
        Ok(RenderedAsset::new(
            item,
            item.name.clone(),
            finalize_svg(&svg).into_bytes(),
            MimeType::Svg,
        ))
    }
}

impl<E: SvgEngine> RenderBackend for EmbeddedBackend<E> {
    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    fn render(&self, items: &ChartSet) -> RenderedBatch {
        render_isolated(
            self.kind(),
            items,
            |item| self.render_item(item),
            svg_placeholder,
        )
    }
}
