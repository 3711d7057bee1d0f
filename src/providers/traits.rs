use async_trait::async_trait;

use super::ProviderError;

/// Common seam over the model backends: a local generation-and-embedding
/// server and a hosted generation API both sit behind this trait.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    async fn generate_batch_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.generate_embedding(text).await?);
        }
        Ok(embeddings)
    }

    /// Model identifier, fetched from the backend where possible so this
    /// doubles as a reachability check.
    async fn get_model_info(&self) -> Result<String, ProviderError>;

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync>;
}

impl Clone for Box<dyn CompletionProvider + Send + Sync> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
