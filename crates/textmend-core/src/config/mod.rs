//! Recognized configuration options and credential handling
//!
//! The core consumes configuration read-only; it never persists the
//! credential. Construction of a remote service fails fast when no
//! usable credential can be resolved.

use serde::{Deserialize, Serialize};


/// Environment variable consulted when no API key is configured
pub const ENV_API_KEY: &str = "TEXTMEND_API_KEY";

/// Recognized options for the correction core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote model identifier
    pub model: String,
    /// Completion token budget per request
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Target natural language for corrections
    pub language: String,
    /// Whether the host should correct on save (consumed by embedders)
    pub auto_correct: bool,
    /// Tokens that exclude a fragment from extraction
    pub ignore_patterns: Vec<String>,
    /// Optional prompt template with a literal `{text}` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    /// API credential; falls back to [`ENV_API_KEY`] when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override for the service endpoint base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            temperature: 0.0,
            language: "fr".to_string(),
            auto_correct: false,
            ignore_patterns: vec![
                "TODO".to_string(),
                "FIXME".to_string(),
                "XXX".to_string(),
            ],
            custom_prompt: None,
            api_key: None,
            base_url: None,
        }
    }
}

impl Settings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API credential
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the target natural language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the ignore-pattern list
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Set a custom prompt template
    pub fn with_custom_prompt(mut self, template: impl Into<String>) -> Self {
        self.custom_prompt = Some(template.into());
        self
    }

    /// Set the endpoint base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Resolve the credential from settings or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(ENV_API_KEY).ok())
            .filter(|key| !key.is_empty())
    }

    /// Whether `key` looks like a usable credential (`sk-` prefix
    /// followed by at least 32 alphanumeric characters)
    pub fn is_valid_api_key(key: &str) -> bool {
        match key.strip_prefix("sk-") {
            Some(rest) => rest.len() >= 32 && rest.chars().all(|c| c.is_ascii_alphanumeric()),
            None => false,
        }
    }

    /// Display-safe version of a credential
    pub fn masked_key(key: &str) -> String {
        let prefix: String = key.chars().take(7).collect();
        format!("{prefix}****")
    }
}
