//! Request options and structured response types for the correction
//! client

use crate::types::Change;
use serde::{Deserialize, Serialize};

/// Tone requested from the correction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Formal,
    Casual,
    Technical,
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Style::Formal => write!(f, "formal"),
            Style::Casual => write!(f, "casual"),
            Style::Technical => write!(f, "technical"),
        }
    }
}

/// Per-request correction options, passed through to the service
/// unchanged. They participate in the cache and deduplication keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionOptions {
    /// Target natural language; falls back to the configured default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Requested tone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Surrounding-code context for the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Prompt template with a literal `{text}` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl CorrectionOptions {
    /// Options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the tone
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the prompt context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set a custom prompt template
    pub fn with_custom_prompt(mut self, template: impl Into<String>) -> Self {
        self.custom_prompt = Some(template.into());
        self
    }
}

/// Key material for caching and in-flight deduplication: the text plus
/// its serialized options, unit-separated.
pub fn cache_key_material(text: &str, options: &CorrectionOptions) -> String {
    let serialized = serde_json::to_string(options).unwrap_or_default();
    format!("{text}\u{1f}{serialized}")
}

/// Structured outcome of a detailed correction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedCorrection {
    /// Corrected text
    pub corrected_text: String,
    /// Text that was submitted
    pub original_text: String,
    /// Itemized changes, empty when the payload degraded to plain text
    pub changes: Vec<Change>,
    /// Service-reported confidence, or 0.5 after degradation
    pub confidence: f64,
    /// Model that produced the correction
    pub model: Option<String>,
}

/// Wire shape of a structured correction response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DetailedPayload {
    #[serde(default)]
    pub corrected_text: Option<String>,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub confidence: Option<f64>,
}
