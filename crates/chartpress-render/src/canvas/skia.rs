//! [`RasterHost`] on top of `usvg` + `resvg` + `tiny-skia`.

use super::surface::{RasterHost, RasterSurface, VectorSize};
use crate::config::RasterFormat;
use crate::error::{RenderError, Result};
use chartpress_core::svg::parse_svg_viewbox;
use std::sync::Arc;

/// Largest edge, in pixels, a surface may have.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

#[derive(Clone)]
pub struct TinySkiaHost {
    fontdb: Arc<usvg::fontdb::Database>,
    font_family: String,
}

impl std::fmt::Debug for TinySkiaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinySkiaHost")
            .field("font_faces", &self.fontdb.len())
            .field("font_family", &self.font_family)
            .finish()
    }
}

impl Default for TinySkiaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TinySkiaHost {
    /// Loads system fonts once; every surface created by this host shares them.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts for rasterization");
        Self {
            fontdb: Arc::new(db),
            // Mermaid baseline assumes a sans-serif stack; system selection may vary.
            font_family: "Arial".to_string(),
        }
    }

    fn parse(&self, svg: &str) -> Result<usvg::Tree> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        opt.font_family = self.font_family.clone();
        usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::SvgParse(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
struct RasterGeometry {
    min_x: f32,
    min_y: f32,
    width: f32,
    height: f32,
    translate_min_to_origin: bool,
}

fn geometry(svg: &str, tree: &usvg::Tree) -> RasterGeometry {
    if parse_svg_viewbox(svg).is_some() {
        // usvg already maps the root viewBox onto (0,0) at the root width/height; translating
        // again would push diagrams with negative viewBox mins off the surface.
        let size = tree.size();
        return RasterGeometry {
            min_x: 0.0,
            min_y: 0.0,
            width: size.width(),
            height: size.height(),
            translate_min_to_origin: false,
        };
    }
    let bbox = tree.root().abs_stroke_bounding_box();
    let w = bbox.width().max(1.0);
    let h = bbox.height().max(1.0);
    if w.is_finite() && h.is_finite() {
        RasterGeometry {
            min_x: bbox.x(),
            min_y: bbox.y(),
            width: w,
            height: h,
            translate_min_to_origin: true,
        }
    } else {
        let size = tree.size();
        RasterGeometry {
            min_x: 0.0,
            min_y: 0.0,
            width: size.width(),
            height: size.height(),
            translate_min_to_origin: false,
        }
    }
}

impl RasterHost for TinySkiaHost {
    type Surface = TinySkiaSurface;

    fn natural_size(&self, svg: &str) -> Result<VectorSize> {
        let tree = self.parse(svg)?;
        let geo = geometry(svg, &tree);
        Ok(VectorSize {
            width: geo.width,
            height: geo.height,
        })
    }

    fn create_surface(&self, width: u32, height: u32) -> Result<TinySkiaSurface> {
        if width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
            return Err(RenderError::SurfaceAlloc { width, height });
        }
        let pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(RenderError::SurfaceAlloc { width, height })?;
        Ok(TinySkiaSurface {
            pixmap,
            host: self.clone(),
        })
    }
}

#[derive(Debug)]
pub struct TinySkiaSurface {
    pixmap: tiny_skia::Pixmap,
    host: TinySkiaHost,
}

impl TinySkiaSurface {
    fn encode_jpeg(&self) -> Result<Vec<u8>> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut flat = tiny_skia::Pixmap::new(w, h).ok_or(RenderError::SurfaceAlloc {
            width: w,
            height: h,
        })?;
        flat.fill(tiny_skia::Color::WHITE);
        flat.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );

        // Composited over opaque white, every alpha is 255 and can be dropped.
        let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
        for (src, dst) in flat.data().chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
            dst.copy_from_slice(&src[..3]);
        }

        let mut out = Vec::new();
        let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 90);
        enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
            .map_err(|err| RenderError::Encode {
                format: "JPEG",
                message: err.to_string(),
            })?;
        Ok(out)
    }
}

impl RasterSurface for TinySkiaSurface {
    fn draw_vector_at(&mut self, svg: &str, scale: f32) -> Result<()> {
        let tree = self.host.parse(svg)?;
        let geo = geometry(svg, &tree);
        let transform = if geo.translate_min_to_origin {
            tiny_skia::Transform::from_row(
                scale,
                0.0,
                0.0,
                scale,
                -geo.min_x * scale,
                -geo.min_y * scale,
            )
        } else {
            tiny_skia::Transform::from_scale(scale, scale)
        };
        resvg::render(&tree, transform, &mut self.pixmap.as_mut());
        Ok(())
    }

    fn encode(&self, format: RasterFormat) -> Result<Vec<u8>> {
        match format {
            RasterFormat::Png => self.pixmap.encode_png().map_err(|err| RenderError::Encode {
                format: "PNG",
                message: err.to_string(),
            }),
            RasterFormat::Jpeg => self.encode_jpeg(),
        }
    }
}
