//! Extract phase: read-only scan of a document tree for diagram sources.

use crate::naming::chart_name;
use crate::node::{DocumentNode, walk};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One diagram to render, addressed by the hash of its source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChartItem {
    pub name: String,
    #[serde(rename = "source")]
    pub source_text: String,
}

impl ChartItem {
    pub fn new(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        Self {
            name: chart_name(&source_text),
            source_text,
        }
    }
}

/// Deduplicated set of charts. Iteration order is by name, which keeps batches deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSet {
    items: BTreeSet<ChartItem>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`; returns `false` when an equal item was already present.
    pub fn insert(&mut self, item: ChartItem) -> bool {
        self.items.insert(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartItem> {
        self.items.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }
}

impl FromIterator<ChartItem> for ChartSet {
    fn from_iter<I: IntoIterator<Item = ChartItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChartSet {
    type Item = &'a ChartItem;
    type IntoIter = std::collections::btree_set::Iter<'a, ChartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Collects every diagram code block under `tree`.
///
/// Blocks without a text child are skipped, not reported.
pub fn extract(tree: &DocumentNode) -> ChartSet {
    let mut set = ChartSet::new();
    walk(tree, &mut |node| {
        if !node.is_diagram_block() {
            return;
        }
        let Some(source) = node.first_text_child() else {
            tracing::debug!("skipping diagram block without text");
            return;
        };
        set.insert(ChartItem::new(source));
    });
    tracing::debug!(charts = set.len(), "extracted diagram sources");
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CODE_BLOCK, LANGUAGE_ATTR};

    fn doc(children: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::new("doc").with_content(children)
    }

    #[test]
    fn empty_tree_yields_empty_set() {
        assert!(extract(&DocumentNode::new("doc")).is_empty());
    }

    #[test]
    fn identical_sources_collapse() {
        let tree = doc(vec![
            DocumentNode::diagram_block(Some("graph TD;A-->B")),
            DocumentNode::new("paragraph")
                .with_content(vec![DocumentNode::diagram_block(Some("graph TD;A-->B"))]),
        ]);
        let set = extract(&tree);
        assert_eq!(set.len(), 1);
        assert!(set.contains_name(&chart_name("graph TD;A-->B")));
    }

    #[test]
    fn names_are_stable_across_scans() {
        let a = extract(&doc(vec![DocumentNode::diagram_block(Some("pie\n\"a\": 1"))]));
        let b = extract(&doc(vec![
            DocumentNode::text("preface"),
            DocumentNode::diagram_block(Some("pie\n\"a\": 1")),
        ]));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_blocks_and_other_languages_are_ignored() {
        let tree = doc(vec![
            DocumentNode::diagram_block(None),
            DocumentNode::new(CODE_BLOCK)
                .with_attr(LANGUAGE_ATTR, "rust")
                .with_content(vec![DocumentNode::text("fn main() {}")]),
        ]);
        assert!(extract(&tree).is_empty());
    }

    #[test]
    fn serializes_as_name_source_list() {
        let set: ChartSet = [ChartItem::new("graph LR;X")].into_iter().collect();
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value[0]["source"], "graph LR;X");
        assert_eq!(value[0]["name"], chart_name("graph LR;X"));
    }
}
