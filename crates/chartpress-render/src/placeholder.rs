//! Fixed fallback images for charts that fail to render.

use crate::backend::{MimeType, RenderedAsset};
use chartpress_core::ChartItem;
use chartpress_core::naming::rename_extension;
use chartpress_core::svg::error_placeholder_svg;

/// A complete 1x1 fully transparent RGBA PNG.
pub const TRANSPARENT_PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x60, 0x00, 0x02, 0x00,
    0x00, 0x05, 0x00, 0x01, 0xe9, 0xfa, 0xdc, 0xd8, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

/// Error image captioned with the chart's name, under the chart's vector file name.
pub fn svg_placeholder(item: &ChartItem) -> RenderedAsset {
    RenderedAsset {
        name: item.name.clone(),
        file_name: item.name.clone(),
        bytes: error_placeholder_svg(&item.name).into_bytes(),
        mime_type: MimeType::Svg,
        is_placeholder: true,
    }
}

/// Transparent pixel under the chart's name with a `.png` extension.
pub fn raster_placeholder(item: &ChartItem) -> RenderedAsset {
    RenderedAsset {
        name: item.name.clone(),
        file_name: rename_extension(&item.name, MimeType::Png.extension()),
        bytes: TRANSPARENT_PIXEL_PNG.to_vec(),
        mime_type: MimeType::Png,
        is_placeholder: true,
    }
}
