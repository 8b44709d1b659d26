#![forbid(unsafe_code)]

//! Document-tree side of chartpress (headless, no I/O).
//!
//! - [`extract`] scans a tree for diagram code blocks and builds a content-addressed [`ChartSet`]
//! - [`rewrite`] swaps uploaded diagram blocks for media nodes
//! - [`color`] and [`entities`] normalize SVG markup for renderers with limited CSS support

pub mod color;
pub mod entities;
pub mod error;
pub mod extract;
pub mod naming;
pub mod node;
pub mod rewrite;
pub mod svg;

pub use color::normalize_colors;
pub use entities::decode_entities;
pub use error::{Error, Result};
pub use extract::{ChartItem, ChartSet, extract};
pub use naming::{chart_name, chart_name_or_placeholder, rename_extension};
pub use node::DocumentNode;
pub use rewrite::{AssetMap, UploadedAsset, rewrite, rewrite_in_place};
