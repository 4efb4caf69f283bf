//! Sociogram Graph - Co-mention graph construction
//!
//! Builds a star-shaped graph around one person: every entity mentioned
//! alongside them in a search result becomes a node, and every mention
//! becomes an edge carrying the snippet, URL and title it came from.
//!
//! Author: hephaex@gmail.com

pub mod builder;
pub mod element;

pub use builder::{EntityGraph, GraphBuilder, DEFAULT_NEWS_RESULTS, DEFAULT_WEB_RESULTS};
pub use element::{
    is_self_reference, truncate_snippet, EdgeData, Element, ElementData, GraphResponse, NodeData,
    NodeType, EDGE_LABEL, SNIPPET_CHARS,
};
