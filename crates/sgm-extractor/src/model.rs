//! Gazetteer model for rule-based NER
//!
//! The model is a JSON artifact listing known entities per category plus
//! the cue words the recognizer uses (organization suffixes, person titles,
//! given names, stopwords). It is loaded once per process:
//! - from `NerConfig::model_path` when the file exists,
//! - otherwise downloaded once from `NerConfig::model_url` and persisted,
//! - otherwise the copy compiled into the binary is used.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sgm_core::{NerConfig, Result, SgmError};

use crate::EntityLabel;

const BUILTIN_GAZETTEER: &str = include_str!("data/gazetteer.json");

static GLOBAL_MODEL: OnceCell<Arc<NerModel>> = OnceCell::new();

/// Serialized form of the model artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Gazetteer {
    pub version: String,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub geopolitical: Vec<String>,
    pub locations: Vec<String>,
    /// Trailing words marking an organization ("Inc", "University")
    pub org_suffixes: Vec<String>,
    /// Leading words of "X of Y" organizations ("Bank of England")
    pub org_heads: Vec<String>,
    /// Honorifics and roles preceding a person's name
    pub person_titles: Vec<String>,
    pub given_names: Vec<String>,
    /// Capitalized words that never start an entity
    pub stopwords: Vec<String>,
}

/// Loaded, indexed gazetteer
#[derive(Debug, Clone)]
pub struct NerModel {
    version: String,
    /// Lowercased mixed-case entries
    entries: HashMap<String, EntityLabel>,
    /// Acronyms ("WHO", "US") match case-sensitively so "Who" and "Us" don't
    acronyms: HashMap<String, EntityLabel>,
    org_suffixes: HashSet<String>,
    org_heads: HashSet<String>,
    person_titles: HashSet<String>,
    given_names: HashSet<String>,
    stopwords: HashSet<String>,
}

impl NerModel {
    /// Build an index from a gazetteer
    pub fn from_gazetteer(gazetteer: Gazetteer) -> Self {
        let mut model = Self {
            version: gazetteer.version,
            entries: HashMap::new(),
            acronyms: HashMap::new(),
            org_suffixes: normalize_set(&gazetteer.org_suffixes),
            org_heads: normalize_set(&gazetteer.org_heads),
            person_titles: normalize_set(&gazetteer.person_titles),
            given_names: normalize_set(&gazetteer.given_names),
            stopwords: normalize_set(&gazetteer.stopwords),
        };

        let groups = [
            (gazetteer.persons, EntityLabel::Person),
            (gazetteer.organizations, EntityLabel::Organization),
            (gazetteer.geopolitical, EntityLabel::Gpe),
            (gazetteer.locations, EntityLabel::Location),
        ];
        for (terms, label) in groups {
            for term in terms {
                model.add_entry(&term, label);
            }
        }

        model
    }

    /// Parse a JSON artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let gazetteer: Gazetteer = serde_json::from_str(json)
            .map_err(|e| SgmError::Model(format!("Invalid gazetteer: {e}")))?;
        Ok(Self::from_gazetteer(gazetteer))
    }

    /// Load a JSON artifact from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SgmError::Model(format!("Failed to read model {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// The model compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GAZETTEER)
    }

    /// Resolve a model according to config, downloading it on first run
    pub async fn load(config: &NerConfig) -> Result<Self> {
        match (&config.model_path, &config.model_url) {
            (Some(path), _) if path.exists() => {
                tracing::info!(path = %path.display(), "Loading NER model");
                Self::from_file(path)
            }
            (Some(path), Some(url)) => {
                tracing::info!(url = %url, path = %path.display(), "NER model missing, downloading");
                let json = fetch_model(url, path).await?;
                Self::from_json(&json)
            }
            (None, Some(url)) => {
                tracing::info!(url = %url, "Downloading NER model (not persisted)");
                let json = download(url).await?;
                Self::from_json(&json)
            }
            (Some(path), None) => {
                tracing::warn!(
                    path = %path.display(),
                    "NER model not found and no download URL configured, using built-in model"
                );
                Self::builtin()
            }
            (None, None) => Self::builtin(),
        }
    }

    /// Initialize the process-wide model
    ///
    /// Later calls return the model from the first successful call and
    /// ignore their config.
    pub async fn init_global(config: &NerConfig) -> Result<Arc<NerModel>> {
        if let Some(model) = GLOBAL_MODEL.get() {
            return Ok(model.clone());
        }
        let model = Self::load(config).await?;
        tracing::info!(version = %model.version(), entries = model.len(), "NER model ready");
        Ok(GLOBAL_MODEL.get_or_init(|| Arc::new(model)).clone())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of known entities
    pub fn len(&self) -> usize {
        self.entries.len() + self.acronyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a known entity by surface text
    pub fn lookup(&self, text: &str) -> Option<EntityLabel> {
        if let Some(label) = self.acronyms.get(text) {
            return Some(*label);
        }
        self.entries.get(&normalize(text)).copied()
    }

    pub fn is_org_suffix(&self, word: &str) -> bool {
        self.org_suffixes.contains(&normalize(word))
    }

    pub fn is_org_head(&self, word: &str) -> bool {
        self.org_heads.contains(&normalize(word))
    }

    pub fn is_person_title(&self, word: &str) -> bool {
        self.person_titles.contains(&normalize(word))
    }

    pub fn is_given_name(&self, word: &str) -> bool {
        self.given_names.contains(&normalize(word))
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&normalize(word))
    }

    fn add_entry(&mut self, term: &str, label: EntityLabel) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        if is_acronym(term) {
            self.acronyms.insert(term.to_string(), label);
        } else {
            self.entries.insert(normalize(term), label);
        }
    }
}

/// Download the artifact and persist it at `path`
///
/// The payload is validated before it is written, so a bad download never
/// leaves a corrupt file behind.
pub async fn fetch_model(url: &str, path: &Path) -> Result<String> {
    let json = download(url).await?;
    serde_json::from_str::<Gazetteer>(&json)
        .map_err(|e| SgmError::Model(format!("Downloaded model is invalid: {e}")))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SgmError::Model(format!("Failed to create {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, &json)
        .await
        .map_err(|e| SgmError::Model(format!("Failed to write {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), bytes = json.len(), "NER model saved");
    Ok(json)
}

async fn download(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SgmError::Model(format!("Model download failed: {e}")))?;

    if !response.status().is_success() {
        return Err(SgmError::Model(format!(
            "Model download failed with status {}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| SgmError::Model(format!("Model download failed: {e}")))
}

/// Lowercase, drop trailing dots ("Inc." == "Inc"), collapse inner whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('.')
        .to_lowercase()
}

fn normalize_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| normalize(w)).collect()
}

fn is_acronym(term: &str) -> bool {
    term.len() <= 5
        && term.chars().all(|c| c.is_ascii_uppercase())
}
