use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::traits::CompletionProvider;
use super::{request_error, ProviderError};

/// Client for the hosted Cohere generation API. Question generation, answer
/// judging, and summaries go through this provider.
#[derive(Clone)]
pub struct CohereProvider {
    api_key: String,
    api_url: String,
    model: String,
    client: Client,
    timeout: Duration,
}

impl CohereProvider {
    pub fn new(
        api_key: &str,
        api_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            model: model.to_string(),
            client,
            timeout,
        })
    }

    /// Generate with explicit sampling limits; the judge wants short,
    /// low-temperature output while question generation needs room.
    pub async fn generate_with(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "max_tokens": max_tokens,
                "temperature": temperature
            }))
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

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        response_json
            .get("generations")
            .and_then(|g| g.get(0))
            .and_then(|g| g.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.trim().to_string())
            .ok_or(ProviderError::MissingField("generations[0].text"))
    }
}

#[async_trait]
impl CompletionProvider for CohereProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_with(prompt, 800, 0.4).await
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Err(ProviderError::Unsupported("CohereProvider", "embeddings"))
    }

    async fn get_model_info(&self) -> Result<String, ProviderError> {
        Ok(self.model.clone())
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
