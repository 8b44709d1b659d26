//! Generic document-tree node, shaped like the Atlassian Document Format.
//!
//! Only the fields the publishing pipeline needs are typed. Everything else a node carries
//! (`marks`, `version`, vendor extensions) lands in [`DocumentNode::extra`] and round-trips
//! through serialization untouched.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type of a fenced code block.
pub const CODE_BLOCK: &str = "codeBlock";
/// Node type of an inline text run.
pub const TEXT: &str = "text";
/// Language marker identifying diagram code blocks.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";
/// Attribute key holding the code block language marker.
pub const LANGUAGE_ATTR: &str = "language";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DocumentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: None,
            content: None,
            text: None,
            extra: Map::new(),
        }
    }

    /// A `text` node carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(TEXT);
        node.text = Some(text.into());
        node
    }

    /// A diagram code block; `source` becomes its single text child when present.
    pub fn diagram_block(source: Option<&str>) -> Self {
        let node = Self::new(CODE_BLOCK).with_attr(LANGUAGE_ATTR, DIAGRAM_LANGUAGE);
        match source {
            Some(source) => node.with_content(vec![Self::text(source)]),
            None => node,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: Vec<DocumentNode>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref()?.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key)?.as_str()
    }

    pub fn children(&self) -> &[DocumentNode] {
        self.content.as_deref().unwrap_or_default()
    }

    /// `true` for `codeBlock` nodes whose language marker is the diagram language.
    pub fn is_diagram_block(&self) -> bool {
        self.node_type == CODE_BLOCK && self.attr_str(LANGUAGE_ATTR) == Some(DIAGRAM_LANGUAGE)
    }

    /// Text of the first `text` child, if any.
    pub fn first_text_child(&self) -> Option<&str> {
        self.children()
            .iter()
            .find(|child| child.node_type == TEXT)
            .and_then(|child| child.text.as_deref())
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(input)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let found = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(found) = found {
            return Err(Error::NotANode { found });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }
}

/// Depth-first, pre-order visit of `node` and all of its descendants.
pub fn walk<'a>(node: &'a DocumentNode, visit: &mut impl FnMut(&'a DocumentNode)) {
    visit(node);
    for child in node.children() {
        walk(child, visit);
    }
}

/// Mutable pre-order visit. Returning `false` from `visit` skips the node's children.
pub fn walk_mut(node: &mut DocumentNode, visit: &mut impl FnMut(&mut DocumentNode) -> bool) {
    if !visit(node) {
        return;
    }
    if let Some(children) = node.content.as_mut() {
        for child in children {
            walk_mut(child, visit);
        }
    }
}
