//! Off-screen raster surface capability used by the canvas backend.

use crate::config::RasterFormat;
use crate::error::Result;

/// Natural (1x) size of a vector image, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorSize {
    pub width: f32,
    pub height: f32,
}

impl VectorSize {
    /// Pixel dimensions of a surface that holds this image at `scale`.
    pub fn scaled_pixels(self, scale: f32) -> (u32, u32) {
        let width = (self.width * scale).ceil().max(1.0) as u32;
        let height = (self.height * scale).ceil().max(1.0) as u32;
        (width, height)
    }
}

/// Creates surfaces and measures vector images for them.
pub trait RasterHost: Send + Sync {
    type Surface: RasterSurface;

    fn natural_size(&self, svg: &str) -> Result<VectorSize>;

    fn create_surface(&self, width: u32, height: u32) -> Result<Self::Surface>;
}

/// A transparent bitmap that a vector image is drawn onto, then encoded.
pub trait RasterSurface {
    fn draw_vector_at(&mut self, svg: &str, scale: f32) -> Result<()>;

    fn encode(&self, format: RasterFormat) -> Result<Vec<u8>>;
}
