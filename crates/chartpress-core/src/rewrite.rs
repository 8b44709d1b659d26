//! Load phase: swap diagram code blocks for media nodes that reference uploaded assets.

use crate::naming::chart_name_or_placeholder;
use crate::node::{DocumentNode, LANGUAGE_ATTR, walk_mut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Node type wrapping a single media reference.
pub const MEDIA_SINGLE: &str = "mediaSingle";
/// Node type of the media reference itself.
pub const MEDIA: &str = "media";
/// Layout applied to rewritten diagram blocks.
pub const DEFAULT_MEDIA_LAYOUT: &str = "center";

/// Reference to an asset stored by the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub collection_id: String,
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Chart name to upload result. `None` records an upload that was attempted and produced nothing.
pub type AssetMap = HashMap<String, Option<UploadedAsset>>;

/// Returns a copy of `tree` with every uploaded diagram block replaced by a media node.
///
/// Blocks whose name has no asset (missing key or `None`) are left exactly as they were.
pub fn rewrite(tree: &DocumentNode, assets: &AssetMap) -> DocumentNode {
    let mut out = tree.clone();
    rewrite_in_place(&mut out, assets);
    out
}

/// In-place variant of [`rewrite`]. Returns the number of rewritten blocks.
pub fn rewrite_in_place(tree: &mut DocumentNode, assets: &AssetMap) -> usize {
    let mut rewritten = 0usize;
    walk_mut(tree, &mut |node| {
        if !node.is_diagram_block() {
            return true;
        }
        let name = chart_name_or_placeholder(node.first_text_child());
        if let Some(Some(asset)) = assets.get(&name) {
            into_media_node(node, asset);
            rewritten += 1;
        } else {
            tracing::debug!(%name, "no uploaded asset; keeping diagram block");
        }
        false
    });
    rewritten
}

fn into_media_node(node: &mut DocumentNode, asset: &UploadedAsset) {
    let mut attrs = node.attrs.take().unwrap_or_default();
    attrs.remove(LANGUAGE_ATTR);
    attrs.insert("layout".to_string(), Value::from(DEFAULT_MEDIA_LAYOUT));

    node.node_type = MEDIA_SINGLE.to_string();
    node.attrs = Some(attrs);
    node.text = None;
    node.content = Some(vec![media_node(asset)]);
}

fn media_node(asset: &UploadedAsset) -> DocumentNode {
    let mut attrs = Map::new();
    attrs.insert("type".to_string(), Value::from("file"));
    attrs.insert(
        "collection".to_string(),
        Value::from(asset.collection_id.as_str()),
    );
    attrs.insert("id".to_string(), Value::from(asset.asset_id.as_str()));
    if let Some(width) = asset.width {
        attrs.insert("width".to_string(), Value::from(width));
    }
    if let Some(height) = asset.height {
        attrs.insert("height".to_string(), Value::from(height));
    }

    let mut node = DocumentNode::new(MEDIA);
    node.attrs = Some(attrs);
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::chart_name;

    fn asset() -> UploadedAsset {
        UploadedAsset {
            collection_id: "c1".to_string(),
            asset_id: "a1".to_string(),
            width: Some(100),
            height: Some(50),
        }
    }

    #[test]
    fn empty_asset_map_leaves_tree_identical() {
        let tree = DocumentNode::new("doc").with_content(vec![
            DocumentNode::diagram_block(Some("graph TD;A-->B")),
            DocumentNode::diagram_block(None),
        ]);
        assert_eq!(rewrite(&tree, &AssetMap::new()), tree);
    }

    #[test]
    fn null_asset_leaves_block_unchanged() {
        let block = DocumentNode::diagram_block(Some("graph TD;A-->B"));
        let tree = DocumentNode::new("doc").with_content(vec![block]);
        let mut assets = AssetMap::new();
        assets.insert(chart_name("graph TD;A-->B"), None);
        assert_eq!(rewrite(&tree, &assets), tree);
    }

    #[test]
    fn uploaded_block_becomes_media_single() {
        let tree = DocumentNode::new("doc").with_content(vec![
            DocumentNode::diagram_block(Some("graph TD;A-->B")).with_attr("uid", "x"),
        ]);
        let mut assets = AssetMap::new();
        assets.insert(chart_name("graph TD;A-->B"), Some(asset()));

        let out = rewrite(&tree, &assets);
        let node = &out.children()[0];
        assert_eq!(node.node_type, MEDIA_SINGLE);
        assert_eq!(node.attr(LANGUAGE_ATTR), None);
        assert_eq!(node.attr_str("layout"), Some(DEFAULT_MEDIA_LAYOUT));
        assert_eq!(node.attr_str("uid"), Some("x"));

        let [media] = node.children() else {
            panic!("expected exactly one media child");
        };
        assert_eq!(media.node_type, MEDIA);
        assert_eq!(media.attr_str("collection"), Some("c1"));
        assert_eq!(media.attr_str("id"), Some("a1"));
        assert_eq!(media.attr("width"), Some(&Value::from(100)));
        assert_eq!(media.attr("height"), Some(&Value::from(50)));
    }

    #[test]
    fn missing_dimensions_are_omitted() {
        let tree = DocumentNode::diagram_block(Some("pie"));
        let mut assets = AssetMap::new();
        assets.insert(
            chart_name("pie"),
            Some(UploadedAsset {
                width: None,
                height: None,
                ..asset()
            }),
        );
        let out = rewrite(&tree, &assets);
        let media = &out.children()[0];
        assert_eq!(media.attr("width"), None);
        assert_eq!(media.attr("height"), None);
    }

    #[test]
    fn other_nodes_are_untouched() {
        let para = DocumentNode::new("paragraph")
            .with_attr("language", "mermaid")
            .with_content(vec![DocumentNode::text("graph TD;A-->B")]);
        let tree = DocumentNode::new("doc").with_content(vec![para.clone()]);
        let mut assets = AssetMap::new();
        assets.insert(chart_name("graph TD;A-->B"), Some(asset()));
        assert_eq!(rewrite(&tree, &assets).children()[0], para);
    }
}
