//! Raster backend: render SVG in-process, then draw it onto an off-screen surface.

pub mod surface;
#[cfg(feature = "canvas")]
pub mod skia;

use crate::backend::{MimeType, RenderBackend, RenderedAsset, RenderedBatch, render_isolated};
use crate::config::{BackendKind, RasterFormat, RenderConfig};
use crate::embedded::SvgEngine;
use crate::error::Result;
use crate::placeholder::raster_placeholder;
use chartpress_core::naming::rename_extension;
use chartpress_core::{ChartItem, ChartSet, normalize_colors};
use surface::{RasterHost, RasterSurface};

#[derive(Debug, Clone)]
pub struct CanvasBackend<E, H> {
    engine: E,
    host: H,
    config: RenderConfig,
}

#[cfg(all(feature = "canvas", feature = "embedded"))]
impl CanvasBackend<crate::embedded::MermaidRsEngine, skia::TinySkiaHost> {
    pub fn mermaid(config: RenderConfig) -> Self {
        Self::new(
            crate::embedded::MermaidRsEngine,
            skia::TinySkiaHost::new(),
            config,
        )
    }
}

impl<E: SvgEngine, H: RasterHost> CanvasBackend<E, H> {
    pub fn new(engine: E, host: H, config: RenderConfig) -> Self {
        Self {
            engine,
            host,
            config,
        }
    }

    fn mime_type(&self) -> MimeType {
        match self.config.raster_format {
            RasterFormat::Png => MimeType::Png,
            RasterFormat::Jpeg => MimeType::Jpeg,
        }
    }

    fn render_item(&self, item: &ChartItem) -> Result<RenderedAsset> {
        let source = self.config.prepare_source(&item.source_text);
        let svg = self.engine.render_svg(&source)?;
        // Entities stay encoded: the rasterizer needs well-formed XML.
        let svg = normalize_colors(&svg);

        let scale = self.config.quality.scale();
        let (width, height) = self.host.natural_size(&svg)?.scaled_pixels(scale);
        let mut surface = self.host.create_surface(width, height)?;
        surface.draw_vector_at(&svg, scale)?;
        let bytes = surface.encode(self.config.raster_format)?;

        let mime_type = self.mime_type();
        Ok(RenderedAsset::new(
            item,
            rename_extension(&item.name, mime_type.extension()),
            bytes,
            mime_type,
        ))
    }
}

impl<E: SvgEngine, H: RasterHost> RenderBackend for CanvasBackend<E, H> {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas
    }

    fn render(&self, items: &ChartSet) -> RenderedBatch {
        render_isolated(
            self.kind(),
            items,
            |item| self.render_item(item),
            raster_placeholder,
        )
    }
}
