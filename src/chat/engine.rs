use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::index::{SearchResult, VectorIndex};
use crate::providers::{CompletionProvider, ProviderError};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No documents indexed, process a PDF first")]
    EmptyIndex,
    #[error("Model backend error: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One side of a conversation exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn now(role: Role, text: &str) -> Self {
        Self {
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Retrieval-augmented QA session: a vector index over the ingested
/// documents plus the running conversation history.
///
/// The index is shared; the history belongs to this engine alone. Building a
/// new engine on re-ingestion discards both together.
#[derive(Clone)]
pub struct ChatEngine {
    session_id: Uuid,
    index: Arc<VectorIndex>,
    provider: Box<dyn CompletionProvider + Send + Sync>,
    history: Vec<Turn>,
    top_k: usize,
    history_window: usize,
}

impl ChatEngine {
    pub fn new(
        index: VectorIndex,
        provider: Box<dyn CompletionProvider + Send + Sync>,
        top_k: usize,
        history_window: usize,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            index: Arc::new(index),
            provider,
            history: Vec::new(),
            top_k,
            history_window,
        }
    }

    /// Same index and backend, fresh history. Evaluation runs against a fork
    /// so scoring questions never leak into the live conversation.
    pub fn fork(&self) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            index: Arc::clone(&self.index),
            provider: self.provider.clone(),
            history: Vec::new(),
            top_k: self.top_k,
            history_window: self.history_window,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Assistant)
            .map(|turn| turn.text.as_str())
    }

    /// Answer a question against the indexed documents.
    ///
    /// Embeds the question, retrieves the nearest chunks, prompts the model
    /// with excerpts plus recent history, and appends both sides of the
    /// exchange to the history before returning.
    pub async fn ask(&mut self, question: &str) -> Result<String, ChatError> {
        if self.index.is_empty() {
            return Err(ChatError::EmptyIndex);
        }

        let query_embedding = self.provider.generate_embedding(question).await?;
        let hits = self.index.search(&query_embedding, self.top_k);

        let prompt = self.build_prompt(question, &hits);
        let answer = self.provider.complete(&prompt).await?;

        self.history.push(Turn::now(Role::User, question));
        self.history.push(Turn::now(Role::Assistant, &answer));

        Ok(answer)
    }

    fn build_prompt(&self, question: &str, hits: &[SearchResult]) -> String {
        let mut context = String::new();

        context.push_str("Document excerpts:\n");
        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!("{}. {}\n", i + 1, hit.text.trim()));
        }

        let recent = self
            .history
            .iter()
            .rev()
            .take(self.history_window)
            .collect::<Vec<_>>();
        if !recent.is_empty() {
            context.push_str("\nRecent conversation:\n");
            for turn in recent.iter().rev() {
                context.push_str(&format!("{}: {}\n", turn.role, turn.text));
            }
        }

        format!(
            "You are a helpful assistant answering questions about the user's documents. \
             Answer using only the document excerpts above the question. \
             If the excerpts do not contain the answer, say so.\n\n\
             {}\n\
             User: {}\n\
             Assistant:",
            context, question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;

    #[derive(Clone)]
    struct StubProvider;

    #[async_trait::async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            Ok("stub answer".to_string())
        }

        async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            Ok(vec![1.0, 0.0])
        }

        async fn get_model_info(&self) -> Result<String, ProviderError> {
            Ok("stub".to_string())
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn ask_on_empty_index_is_an_error() {
        let mut engine = ChatEngine::new(VectorIndex::default(), Box::new(StubProvider), 4, 10);
        assert!(matches!(engine.ask("anything").await, Err(ChatError::EmptyIndex)));
    }

    #[tokio::test]
    async fn ask_appends_both_turns_to_history() {
        let index = VectorIndex::build(
            vec!["some chunk".to_string()],
            vec![vec![1.0, 0.0]],
        )
        .unwrap();
        let mut engine = ChatEngine::new(index, Box::new(StubProvider), 4, 10);

        let answer = engine.ask("a question").await.unwrap();
        assert_eq!(answer, "stub answer");
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.history()[0].role, Role::User);
        assert_eq!(engine.history()[1].role, Role::Assistant);
        assert_eq!(engine.last_answer(), Some("stub answer"));
    }

    #[tokio::test]
    async fn fork_shares_the_index_but_not_the_history() {
        let index = VectorIndex::build(
            vec!["some chunk".to_string()],
            vec![vec![1.0, 0.0]],
        )
        .unwrap();
        let mut engine = ChatEngine::new(index, Box::new(StubProvider), 4, 10);
        engine.ask("a question").await.unwrap();

        let fork = engine.fork();
        assert_eq!(fork.chunk_count(), engine.chunk_count());
        assert!(fork.history().is_empty());
        assert_ne!(fork.session_id(), engine.session_id());
    }
}
