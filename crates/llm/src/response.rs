//! Provider response shapes
//!
//! Completion providers do not agree on where the generated text lives.
//! `ProviderReply::classify` checks the known locations in a fixed order and
//! records which one matched; anything else is kept as `Unrecognized` with
//! the raw body so callers can log it.

use serde::Deserialize;
use serde_json::Value;

/// Text placed directly on the response object: `{"text": "..."}`
#[derive(Debug, Deserialize)]
struct TopLevelShape {
    text: String,
}

/// Text wrapped in a `response` envelope: `{"response": {"text": "..."}}`
#[derive(Debug, Deserialize)]
struct NestedShape {
    response: TopLevelShape,
}

/// Gemini `generateContent` body: `candidates[0].content.parts[0].text`.
/// Only that one part is read; later candidates and parts may be anything.
const FIRST_CANDIDATE_PART_TEXT: &str = "/candidates/0/content/parts/0/text";

/// A provider answer tagged with the shape it arrived in
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    TopLevelText(String),
    NestedText(String),
    CandidatePart(String),
    Unrecognized(Value),
}

impl ProviderReply {
    /// Classify a raw provider body. Empty strings count as missing.
    pub fn classify(raw: Value) -> Self {
        if let Some(text) = Self::top_level(&raw) {
            return Self::TopLevelText(text);
        }
        if let Some(text) = Self::nested(&raw) {
            return Self::NestedText(text);
        }
        if let Some(text) = Self::first_candidate_part(&raw) {
            return Self::CandidatePart(text);
        }
        Self::Unrecognized(raw)
    }

    fn top_level(raw: &Value) -> Option<String> {
        TopLevelShape::deserialize(raw)
            .ok()
            .map(|s| s.text)
            .filter(|t| !t.is_empty())
    }

    fn nested(raw: &Value) -> Option<String> {
        NestedShape::deserialize(raw)
            .ok()
            .map(|s| s.response.text)
            .filter(|t| !t.is_empty())
    }

    fn first_candidate_part(raw: &Value) -> Option<String> {
        raw.pointer(FIRST_CANDIDATE_PART_TEXT)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// The extracted text, or `None` for an unrecognized body
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::TopLevelText(t) | Self::NestedText(t) | Self::CandidatePart(t) => Some(t),
            Self::Unrecognized(_) => None,
        }
    }

    /// Short label for logs
    pub fn shape(&self) -> &'static str {
        match self {
            Self::TopLevelText(_) => "top_level_text",
            Self::NestedText(_) => "nested_text",
            Self::CandidatePart(_) => "candidate_part",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}
