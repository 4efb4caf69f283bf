//! Sociogram Extractor - Named entity recognition
//!
//! Finds people, organizations, geo-political entities and locations in
//! search snippets. Only those four categories are ever surfaced.

use serde::{Deserialize, Serialize};
use sgm_core::Result;

pub mod model;
pub mod ner;

pub use model::{Gazetteer, NerModel};
pub use ner::RuleBasedNer;

/// Entity categories surfaced by extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    /// Countries, cities, states
    #[serde(rename = "GPE")]
    Gpe,
    /// Non-political places: continents, oceans, mountains
    #[serde(rename = "LOC")]
    Location,
}

impl EntityLabel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORG",
            Self::Gpe => "GPE",
            Self::Location => "LOC",
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity mention found in a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Surface text as it appears in the input
    pub text: String,
    pub label: EntityLabel,
    /// Byte offsets into the input
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

impl EntityMention {
    /// Create a mention with full confidence and no span information
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            label,
            start: 0,
            end,
            confidence: 1.0,
        }
    }
}

/// Trait for entity extractors
///
/// Results come back in the order the extractor found them; callers must
/// not assume any sorting beyond that.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<EntityMention>>;
}
