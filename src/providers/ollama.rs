use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::traits::CompletionProvider;
use super::{request_error, ProviderError};

/// Client for a local Ollama server, used for both answer generation and
/// chunk embeddings.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    embed_model: String,
    client: Client,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(
        base_url: &str,
        model: &str,
        embed_model: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            embed_model: embed_model.to_string(),
            client,
            timeout,
        })
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .post_json(
                "/api/generate",
                json!({
                    "model": self.model,
                    "prompt": prompt,
                    "stream": false
                }),
            )
            .await?;

        response
            .get("response")
            .and_then(|r| r.as_str())
            .map(|s| s.trim().to_string())
            .ok_or(ProviderError::MissingField("response"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let response = self
            .post_json(
                "/api/embeddings",
                json!({
                    "model": self.embed_model,
                    "prompt": text
                }),
            )
            .await?;

        let values = response
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or(ProviderError::MissingField("embedding"))?;

        Ok(values
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect())
    }

    async fn get_model_info(&self) -> Result<String, ProviderError> {
        // Hitting the tag list verifies the server is actually reachable
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        Ok(format!("{} (embeddings: {})", self.model, self.embed_model))
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
