//! Remote correction service abstraction
//!
//! The service is an external capability: a single-turn completion
//! call with an optional structured-output mode. [`OpenAiService`] is
//! the bundled chat-completions implementation.

use crate::config::Settings;
use crate::error::{MendError, MendResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Single-turn completion capability of the remote correction service
#[async_trait]
pub trait CorrectionService: Send + Sync {
    /// Send `prompt` and return the response text. When `structured`
    /// is set the service is asked for a JSON-object response.
    async fn request(&self, prompt: &str, structured: bool) -> MendResult<String>;
}

/// Chat-completions implementation of [`CorrectionService`]
pub struct OpenAiService {
    settings: Settings,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiService {
    /// Create a service from settings.
    ///
    /// Fails with a configuration error, without retrying, when no
    /// usable credential can be resolved.
    pub fn new(settings: Settings) -> MendResult<Self> {
        let api_key = settings
            .resolve_api_key()
            .ok_or_else(|| MendError::config("missing API credential"))?;
        if !Settings::is_valid_api_key(&api_key) {
            return Err(MendError::config(format!(
                "invalid API credential: {}",
                Settings::masked_key(&api_key)
            )));
        }
        Ok(Self {
            settings,
            api_key,
            http_client: reqwest::Client::new(),
        })
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Whether the service answers a trivial prompt
    pub async fn healthcheck(&self) -> bool {
        match self.request("ping", false).await {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "healthcheck failed");
                false
            }
        }
    }
}

#[async_trait]
impl CorrectionService for OpenAiService {
    #[instrument(skip(self, prompt), fields(model = %self.settings.model, structured), level = "debug")]
    async fn request(&self, prompt: &str, structured: bool) -> MendResult<String> {
        let url = format!("{}/chat/completions", self.base_url());

        let mut request_body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });
        if structured {
            request_body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| MendError::service(format!("correction request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MendError::service(format!(
                "correction service error (status {status}): {error_text}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| MendError::service(format!("malformed service response: {e}")))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();
        if content.is_empty() {
            return Err(MendError::service("empty response body"));
        }
        Ok(content)
    }
}
