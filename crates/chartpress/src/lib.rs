#![forbid(unsafe_code)]

//! `chartpress` turns Mermaid code blocks in a document tree into uploaded images.
//!
//! A publish run extracts every diagram block, renders the distinct charts through one
//! [`RenderBackend`](render::RenderBackend), hands each image to an [`Uploader`], and rewrites
//! the tree so uploaded charts become media nodes. Charts that fail to render are uploaded as
//! placeholders; charts that fail to upload keep their original code block.
//!
//! # Features
//!
//! - `embedded`: in-process SVG rendering (`render::EmbeddedBackend::mermaid`)
//! - `canvas`: in-process rasterization (`render::CanvasBackend::mermaid`, needs `embedded`)

pub use chartpress_core::*;

pub mod dimensions;
pub mod pipeline;
pub mod upload;

pub use pipeline::{PublishOutcome, PublishReport, Publisher, publish};
pub use upload::{DirectoryUploader, UploadError, Uploader};

pub mod render {
    pub use chartpress_render::*;
}
