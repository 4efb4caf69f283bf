//! Named Entity Recognition (NER) module
//!
//! Rule-based recognizer for PERSON / ORG / GPE / LOC:
//! - capitalized word runs are collected as candidate spans
//! - spans are classified through the gazetteer, organization suffixes
//!   and heads, person titles and given names
//! - unclassifiable spans are scanned for known sub-spans, then dropped

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;

use crate::model::NerModel;
use crate::{EntityExtractor, EntityLabel, EntityMention};
use sgm_core::{Result, SgmError};

/// Lowercase particles allowed inside a name ("Bank of England", "Ludwig van Beethoven")
const CONNECTORS: &[&str] = &[
    "of", "the", "de", "van", "von", "der", "da", "del", "la", "du", "bin", "al",
];

/// Honorific-free abbreviations that do not end a sentence
const NAME_ABBREVIATIONS: &[&str] = &["st", "mt", "ft"];

/// Most connectors tolerated between two capitalized words
const MAX_CONNECTOR_RUN: usize = 2;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone)]
struct Word {
    /// Byte offsets of the cleaned word
    start: usize,
    end: usize,
    /// End of the raw match, before trailing punctuation was trimmed
    raw_end: usize,
    capitalized: bool,
    connector: bool,
    /// Ends a span: sentence period, possessive
    terminal: bool,
}

/// A classified candidate before confidence filtering
#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    label: EntityLabel,
    confidence: f32,
}

// ============================================================================
// Rule-based NER
// ============================================================================

/// Rule-based NER over a gazetteer model
pub struct RuleBasedNer {
    model: Arc<NerModel>,
    word_pattern: Regex,
    /// Candidates scoring below this are dropped
    min_confidence: f32,
}

impl RuleBasedNer {
    /// Create a recognizer over the given model
    pub fn new(model: Arc<NerModel>) -> Result<Self> {
        let word_pattern = Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’&.\-]*")
            .map_err(|e| SgmError::Extraction(format!("Invalid word pattern: {e}")))?;

        Ok(Self {
            model,
            word_pattern,
            min_confidence: 0.5,
        })
    }

    /// Set confidence threshold
    pub fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold.clamp(0.0, 1.0);
        self
    }

    /// Split text into words, marking capitalization, connectors and sentence ends
    fn tokenize(&self, text: &str) -> Vec<Word> {
        self.word_pattern
            .find_iter(text)
            .map(|m| {
                let raw = m.as_str();
                let mut cleaned = raw.trim_end_matches(['\'', '’', '-']);
                let mut terminal = false;

                for possessive in ["'s", "’s"] {
                    if let Some(stem) = cleaned.strip_suffix(possessive) {
                        cleaned = stem;
                        terminal = true;
                    }
                }

                if let Some(stem) = cleaned.strip_suffix('.') {
                    let stem = stem.trim_end_matches('.');
                    if self.is_abbreviation(stem) {
                        // "Dr." and "J." belong to the following name
                        if self.model.is_org_suffix(stem) {
                            cleaned = stem;
                            terminal = true;
                        }
                    } else {
                        cleaned = stem;
                        terminal = true;
                    }
                }

                let first = cleaned.chars().next();
                Word {
                    start: m.start(),
                    end: m.start() + cleaned.len(),
                    raw_end: m.end(),
                    capitalized: first.is_some_and(|c| c.is_uppercase()),
                    connector: CONNECTORS.contains(&cleaned),
                    terminal,
                }
            })
            .filter(|w| w.end > w.start)
            .collect()
    }

    fn is_abbreviation(&self, stem: &str) -> bool {
        stem.chars().count() == 1
            || self.model.is_person_title(stem)
            || self.model.is_org_suffix(stem)
            || NAME_ABBREVIATIONS.contains(&stem.to_lowercase().as_str())
    }

    /// Group words into runs of capitalized words joined by whitespace and connectors
    fn spans(&self, text: &str, words: &[Word]) -> Vec<Vec<Word>> {
        let adjacent = |a: &Word, b: &Word| {
            text.get(a.raw_end..b.start)
                .is_some_and(|gap| !gap.is_empty() && gap.chars().all(char::is_whitespace))
        };

        let mut spans = Vec::new();
        let mut i = 0;

        while i < words.len() {
            if !words[i].capitalized {
                i += 1;
                continue;
            }

            let mut span = vec![words[i].clone()];
            let mut j = i;

            'extend: while !words[j].terminal {
                // Up to MAX_CONNECTOR_RUN lowercase connectors, then a capitalized word
                for skip in 0..=MAX_CONNECTOR_RUN {
                    let next = j + skip + 1;
                    if next >= words.len() {
                        break 'extend;
                    }
                    let bridge = &words[j..=next];
                    let joined = bridge.windows(2).all(|w| adjacent(&w[0], &w[1]));
                    let connectors_ok = bridge[1..bridge.len() - 1]
                        .iter()
                        .all(|w| w.connector && !w.terminal);

                    if !joined || !connectors_ok {
                        break 'extend;
                    }
                    if words[next].capitalized {
                        span.extend_from_slice(&words[j + 1..=next]);
                        j = next;
                        continue 'extend;
                    }
                    if !words[next].connector {
                        break 'extend;
                    }
                }
                break;
            }

            spans.push(span);
            i = j + 1;
        }

        spans
    }

    /// Classify a whole span, trimming leading stopwords, else scan it for known parts
    fn classify_span(&self, text: &str, span: &[Word]) -> Vec<Candidate> {
        let mut s = 0;
        while s < span.len() {
            let slice = &span[s..];
            if let Some(candidate) = self.classify(text, slice) {
                return vec![candidate];
            }
            let head = word_text(text, &slice[0]);
            if slice[0].connector || self.model.is_stopword(head) {
                s += 1;
                continue;
            }
            break;
        }

        if s >= span.len() {
            return Vec::new();
        }
        self.scan_known(text, &span[s..])
    }

    /// Classify a run of words as a single entity
    fn classify(&self, text: &str, words: &[Word]) -> Option<Candidate> {
        let first = words.first()?;
        let last = words.last()?;
        if first.connector || last.connector {
            return None;
        }

        let surface = span_text(text, words);
        let first_text = word_text(text, first);
        let last_text = word_text(text, last);
        let has_connector = words.iter().any(|w| w.connector);
        let len = words.len();

        if let Some(label) = self.model.lookup(surface) {
            return Some(candidate(words, label, 0.95));
        }

        if self.model.is_stopword(first_text) {
            return None;
        }

        if len >= 2 && self.model.is_org_suffix(last_text) {
            return Some(candidate(words, EntityLabel::Organization, 0.85));
        }

        if len >= 3
            && self.model.is_org_head(first_text)
            && words.get(1).is_some_and(|w| word_text(text, w) == "of")
        {
            return Some(candidate(words, EntityLabel::Organization, 0.8));
        }

        if self.model.is_person_title(first_text) {
            let rest = &words[1..];
            let rest_start = rest
                .iter()
                .position(|w| !self.model.is_person_title(word_text(text, w)))?;
            let name = &rest[rest_start..];
            if !name.is_empty() && name.len() <= 4 && !name.iter().any(|w| w.connector) {
                return Some(candidate(name, EntityLabel::Person, 0.85));
            }
            return None;
        }

        if has_connector {
            return None;
        }

        if (2..=4).contains(&len) && self.model.is_given_name(first_text) {
            return Some(candidate(words, EntityLabel::Person, 0.75));
        }

        if (2..=3).contains(&len) {
            return Some(candidate(words, EntityLabel::Person, 0.45));
        }

        None
    }

    /// Find known entities and titled names inside an unclassified span
    fn scan_known(&self, text: &str, words: &[Word]) -> Vec<Candidate> {
        let mut found = Vec::new();
        let mut i = 0;

        'outer: while i < words.len() {
            for j in (i + 1..=words.len()).rev() {
                let window = &words[i..j];
                if window[0].connector || window[window.len() - 1].connector {
                    continue;
                }
                if let Some(label) = self.model.lookup(span_text(text, window)) {
                    found.push(candidate(window, label, 0.9));
                    i = j;
                    continue 'outer;
                }
            }

            if self.model.is_person_title(word_text(text, &words[i])) {
                let name: Vec<Word> = words[i + 1..]
                    .iter()
                    .take_while(|w| !w.connector)
                    .take(3)
                    .cloned()
                    .collect();
                if !name.is_empty() {
                    found.push(candidate(&name, EntityLabel::Person, 0.8));
                    i += 1 + name.len();
                    continue;
                }
            }

            i += 1;
        }

        found
    }

    /// Remove overlapping candidates, keeping highest confidence
    fn deduplicate(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let mut result: Vec<Candidate> = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for c in candidates {
            let overlaps = (c.start..c.end).any(|i| covered.contains(&i));
            if !overlaps {
                covered.extend(c.start..c.end);
                result.push(c);
            }
        }

        result.sort_by_key(|c| c.start);
        result
    }
}

impl EntityExtractor for RuleBasedNer {
    fn extract(&self, text: &str) -> Result<Vec<EntityMention>> {
        let words = self.tokenize(text);

        let candidates: Vec<Candidate> = self
            .spans(text, &words)
            .iter()
            .flat_map(|span| self.classify_span(text, span))
            .filter(|c| c.confidence >= self.min_confidence)
            .collect();

        Ok(self
            .deduplicate(candidates)
            .into_iter()
            .map(|c| EntityMention {
                text: text[c.start..c.end].to_string(),
                label: c.label,
                start: c.start,
                end: c.end,
                confidence: c.confidence,
            })
            .collect())
    }
}

fn word_text<'a>(text: &'a str, word: &Word) -> &'a str {
    &text[word.start..word.end]
}

fn span_text<'a>(text: &'a str, words: &[Word]) -> &'a str {
    match (words.first(), words.last()) {
        (Some(first), Some(last)) => &text[first.start..last.end],
        _ => "",
    }
}

fn candidate(words: &[Word], label: EntityLabel, confidence: f32) -> Candidate {
    Candidate {
        start: words.first().map_or(0, |w| w.start),
        end: words.last().map_or(0, |w| w.end),
        label,
        confidence,
    }
}

// ============================================================================
// Tests
// ============================================================================
