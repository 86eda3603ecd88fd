use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Absolute address of a position within a schema document. Doubles as
/// the graph's node key: one location, at most one node.
pub type SchemaLocation = String;

/// Synthetic parent id used for the root node's ingress edge. Never
/// present in the node list itself.
pub const ROOT_PARENT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Left,
    Right,
    Bottom,
}

/// Named anchor on a node's boundary. A specific edge attaches to a
/// specific handle so that property fan-out stays visually legible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handle {
    #[serde(rename = "handleId")]
    pub id: String,
    pub side: HandleSide,
}

impl Handle {
    pub fn new(id: impl Into<String>, side: HandleSide) -> Self {
        Self {
            id: id.into(),
            side,
        }
    }
}

/// Rendered value of one keyword row in a node's table. `ellipsis`
/// marks values that stand in for a collapsed sub-schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordDisplay {
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ellipsis: Option<&'static str>,
}

pub const ELLIPSIS: &str = "{ ... }";

impl KeywordDisplay {
    pub fn plain(value: serde_json::Value) -> Self {
        Self {
            value,
            ellipsis: None,
        }
    }

    pub fn collapsed(value: serde_json::Value) -> Self {
        Self {
            value,
            ellipsis: Some(ELLIPSIS),
        }
    }
}

/// Keyword table accumulated during traversal. Insertion order is the
/// normalized keyword order, which the renderer relies on, so this is
/// a vector rather than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordTable {
    rows: Vec<(String, KeywordDisplay)>,
}

impl KeywordTable {
    pub fn insert(&mut self, key: impl Into<String>, display: KeywordDisplay) {
        self.rows.push((key.into(), display));
    }

    pub fn get(&self, key: &str) -> Option<&KeywordDisplay> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeywordDisplay)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for KeywordTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (key, display) in &self.rows {
            map.serialize_entry(key, display)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: SchemaLocation,
    pub label: String,
    /// Recursion depth at first visit. Never updated afterwards, even
    /// when later references reach the node through a shorter path.
    pub depth: usize,
    #[serde(rename = "isBooleanSchema")]
    pub is_boolean_schema: bool,
    pub keywords: KeywordTable,
    pub color: String,
    #[serde(rename = "sourceHandles")]
    pub source_handles: Vec<Handle>,
    #[serde(rename = "targetHandles")]
    pub target_handles: Vec<Handle>,
    pub position: Point,
    /// Actual rendered box size, reported back by the rendering
    /// surface. Zero until measured; collision resolution waits on it.
    #[serde(skip)]
    pub measured: Size,
}

impl GraphNode {
    pub fn shell(id: impl Into<String>, label: impl Into<String>, depth: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            depth,
            is_boolean_schema: false,
            keywords: KeywordTable::default(),
            color: String::new(),
            source_handles: Vec::new(),
            target_handles: Vec::new(),
            position: Point::default(),
            measured: Size::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle")]
    pub source_handle: String,
    #[serde(rename = "targetHandle")]
    pub target_handle: String,
    pub color: String,
}

impl GraphEdge {
    /// Edge ids follow `{parent}--{sourceHandle}--{target}--{targetHandle}`,
    /// so a repeated compilation of the same schema reproduces them
    /// byte for byte.
    pub fn new(
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let source_handle = source_handle.into();
        let target = target.into();
        let target_handle = target_handle.into();
        Self {
            id: format!("{source}--{source_handle}--{target}--{target_handle}"),
            source,
            target,
            source_handle,
            target_handle,
            color: color.into(),
        }
    }
}

/// One compilation pass's output: creation-ordered nodes plus edges.
/// Rebuilt from scratch on every schema change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }
}
