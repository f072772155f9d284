//! Loading the hierarchical input document.
//!
//! The input is a recursive `{ id?, name, content, children: [...] }` JSON
//! object. Parsing is tolerant: a section that is malformed becomes a leaf
//! with empty text instead of failing the whole load. Only input that is not
//! JSON at all, or whose top level is not an object, is rejected.

use crate::id::NodeId;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root must be a section object")]
    NotAnObject,
}

/// One parsed document section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: NodeId,
    pub name: String,
    /// Raw content, still carrying any markup the source left in.
    pub content: String,
    pub children: Vec<Section>,
}

impl Section {
    /// A section with no content and no children.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::generated(),
            name: name.into(),
            content: String::new(),
            children: Vec::new(),
        }
    }

    /// Number of sections in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Section::count).sum::<usize>()
    }
}

/// A loaded document: the root section plus load diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Section,
    /// Sections that were replaced by empty leaves while loading.
    pub malformed: usize,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        let Value::Object(map) = value else {
            return Err(LoadError::NotAnObject);
        };
        let mut parser = Parser::default();
        let root = parser.section(map, true, "$");
        log::debug!(
            "loaded document: {} sections, {} malformed",
            root.count(),
            parser.malformed
        );
        Ok(Document {
            root,
            malformed: parser.malformed,
        })
    }

    /// Total number of sections; never zero since the root always exists.
    pub fn len(&self) -> usize {
        self.root.count()
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct Parser {
    seen: HashSet<NodeId>,
    malformed: usize,
}

impl Parser {
    fn section(&mut self, map: &Map<String, Value>, is_root: bool, path: &str) -> Section {
        let id = self.id(map.get("id"), path);

        let name = match map.get("name") {
            Some(Value::String(s)) => s.clone(),
            _ if is_root => String::new(),
            _ => {
                log::warn!("section {path} has no name; treating it as an empty leaf");
                self.malformed += 1;
                return Section {
                    id,
                    name: String::new(),
                    content: String::new(),
                    children: Vec::new(),
                };
            }
        };

        let content = match map.get("content") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                log::warn!("section {path} has non-text content ({other}); dropping it");
                String::new()
            }
        };

        let children = match map.get("children") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.child(item, &format!("{path}.children[{i}]")))
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                log::warn!("section {path} has a non-array `children`; ignoring it");
                Vec::new()
            }
        };

        Section {
            id,
            name,
            content,
            children,
        }
    }

    fn child(&mut self, value: &Value, path: &str) -> Section {
        match value {
            Value::Object(map) => self.section(map, false, path),
            _ => {
                log::warn!("section {path} is not an object; treating it as an empty leaf");
                self.malformed += 1;
                let leaf = Section::leaf("");
                self.seen.insert(leaf.id);
                leaf
            }
        }
    }

    fn id(&mut self, value: Option<&Value>, path: &str) -> NodeId {
        let explicit = match value {
            Some(Value::String(s)) => Some(NodeId::intern(s)),
            Some(Value::Number(n)) => Some(NodeId::intern(&n.to_string())),
            _ => None,
        };
        let id = match explicit {
            Some(id) if self.seen.contains(&id) => {
                log::warn!("section {path} reuses id {id}; assigning a fresh one");
                NodeId::generated()
            }
            Some(id) => id,
            None => NodeId::generated(),
        };
        self.seen.insert(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_sections() {
        let doc = Document::from_json(
            r#"{"name": "Root", "content": "<p>Intro</p>", "children": [
                {"name": "A", "children": [{"name": "A.1", "content": "x"}]},
                {"name": "B"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.malformed, 0);
        assert_eq!(doc.root.name, "Root");
        assert_eq!(doc.root.content, "<p>Intro</p>");
        let names: Vec<&str> = doc.root.children.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(doc.root.children[0].children[0].content, "x");
    }

    #[test]
    fn nameless_child_becomes_empty_leaf() {
        let doc = Document::from_json(
            r#"{"name": "Root", "children": [
                {"content": "lost", "children": [{"name": "orphan"}]}
            ]}"#,
        )
        .unwrap();
        let bad = &doc.root.children[0];
        assert_eq!(bad.name, "");
        assert_eq!(bad.content, "");
        assert!(bad.children.is_empty());
        assert_eq!(doc.malformed, 1);
    }

    #[test]
    fn non_object_child_becomes_empty_leaf() {
        let doc = Document::from_json(r#"{"name": "Root", "children": [42, {"name": "ok"}]}"#).unwrap();
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[0].name, "");
        assert_eq!(doc.root.children[1].name, "ok");
        assert_eq!(doc.malformed, 1);
    }

    #[test]
    fn non_string_content_is_dropped() {
        let doc = Document::from_json(r#"{"name": "Root", "content": {"html": "<b>"}}"#).unwrap();
        assert_eq!(doc.root.content, "");
    }

    #[test]
    fn ids_accept_strings_and_integers() {
        let doc = Document::from_json(
            r#"{"id": "toc", "name": "Root", "children": [{"id": 7, "name": "Seven"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.root.id.as_str(), "toc");
        assert_eq!(doc.root.children[0].id.as_str(), "7");
    }

    #[test]
    fn duplicate_ids_are_replaced() {
        let doc = Document::from_json(
            r#"{"id": "dup", "name": "Root", "children": [{"id": "dup", "name": "Again"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.root.id.as_str(), "dup");
        assert_ne!(doc.root.children[0].id, doc.root.id);
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(Document::from_json("[1, 2]"), Err(LoadError::NotAnObject)));
        assert!(matches!(Document::from_json("{nope"), Err(LoadError::Json(_))));
    }
}
