//! Graph elements and their wire format
//!
//! Every element serializes as `{"data": {...}}` so the response can be
//! handed straight to a Cytoscape-style renderer.

use serde::{Deserialize, Serialize};
use sgm_extractor::EntityLabel;
use utoipa::ToSchema;

/// Relationship label carried by every edge
pub const EDGE_LABEL: &str = "MENTIONED_WITH";

/// Characters of source text kept in an edge snippet
pub const SNIPPET_CHARS: usize = 100;

/// Node category: the queried person, or the entity's extraction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum NodeType {
    Central,
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "GPE")]
    Gpe,
    #[serde(rename = "LOC")]
    Location,
}

impl From<EntityLabel> for NodeType {
    fn from(label: EntityLabel) -> Self {
        match label {
            EntityLabel::Person => Self::Person,
            EntityLabel::Organization => Self::Organization,
            EntityLabel::Gpe => Self::Gpe,
            EntityLabel::Location => Self::Location,
        }
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NodeData {
    /// Display text, first-seen casing
    pub id: String,
    /// Same as `id`
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

impl NodeData {
    pub fn new(text: impl Into<String>, node_type: NodeType) -> Self {
        let id = text.into();
        Self {
            label: id.clone(),
            id,
            node_type,
        }
    }
}

/// Edge payload: one mention of an entity next to the queried person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EdgeData {
    /// `e0`, `e1`, ... in creation order
    pub id: String,
    /// The queried person's name
    pub source: String,
    /// Entity text as extracted from this snippet
    pub target: String,
    pub label: String,
    /// Truncated source text, always ending in `...`
    pub snippet: String,
    pub url: String,
    pub title: String,
}

/// Element payload; edges are tried first when deserializing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ElementData {
    Edge(EdgeData),
    Node(NodeData),
}

/// A single graph element, wrapped as `{"data": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Element {
    pub data: ElementData,
}

impl Element {
    pub fn node(data: NodeData) -> Self {
        Self {
            data: ElementData::Node(data),
        }
    }

    pub fn edge(data: EdgeData) -> Self {
        Self {
            data: ElementData::Edge(data),
        }
    }

    pub fn as_node(&self) -> Option<&NodeData> {
        match &self.data {
            ElementData::Node(node) => Some(node),
            ElementData::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeData> {
        match &self.data {
            ElementData::Edge(edge) => Some(edge),
            ElementData::Node(_) => None,
        }
    }
}

/// Graph response: nodes in insertion order, then edges in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GraphResponse {
    pub elements: Vec<Element>,
}

impl GraphResponse {
    /// Response for an empty query
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.elements.iter().filter_map(Element::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.elements.iter().filter_map(Element::as_edge)
    }
}

/// First [`SNIPPET_CHARS`] characters of `text` followed by `...`
///
/// Counts characters, not bytes. The marker is appended even when nothing
/// was cut.
pub fn truncate_snippet(text: &str) -> String {
    let mut snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    snippet.push_str("...");
    snippet
}

/// Whether an entity is the queried person under another spelling
///
/// Case-insensitive substring test in both directions, so "Smith" and
/// "John Smith Jr." both count as "John Smith". Unrelated entities that
/// merely contain the name ("Gore-Tex" for "Gore") are filtered too.
pub fn is_self_reference(person: &str, entity: &str) -> bool {
    let person = person.to_lowercase();
    let entity = entity.to_lowercase();
    entity.contains(&person) || person.contains(&entity)
}
