use async_trait::async_trait;

use pdf_chat_agent::chat::ChatEngine;
use pdf_chat_agent::evaluation::{EvalError, Evaluator, QuestionGenerator};
use pdf_chat_agent::index::{split_text, VectorIndex};
use pdf_chat_agent::providers::{CompletionProvider, ProviderError};

const CHAT_ANSWER: &str = "The capital of France is Paris.";

/// Deterministic stand-in for the model backends: embeddings are hashed
/// bags of words (identical text always embeds identically) and completions
/// are canned per prompt kind.
#[derive(Clone)]
struct MockProvider;

fn bag_of_words_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 64];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let token = token.to_lowercase();
        let mut hash: u32 = 2166136261;
        for b in token.bytes() {
            hash ^= b as u32;
            hash = hash.wrapping_mul(16777619);
        }
        v[(hash % 64) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.contains("expert evaluator") {
            return Ok("Score: 0.9".to_string());
        }
        if prompt.contains("question-answer pairs") {
            return Ok(format!(
                "Q1: What is the capital of France?\nA1: {}\n\
                 Q2: What color are bananas?\nA2: {}",
                CHAT_ANSWER, CHAT_ANSWER
            ));
        }
        if prompt.contains("Summarize the following content") {
            return Ok("A short summary.".to_string());
        }
        // Conversational retrieval prompt
        Ok(CHAT_ANSWER.to_string())
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(bag_of_words_embedding(text))
    }

    async fn get_model_info(&self) -> Result<String, ProviderError> {
        Ok("mock".to_string())
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}

async fn engine_over(texts: &[&str]) -> ChatEngine {
    let provider = MockProvider;
    let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
    let embeddings = provider.generate_batch_embeddings(&texts).await.unwrap();
    let index = VectorIndex::build(texts, embeddings).unwrap();
    ChatEngine::new(index, Box::new(provider), 2, 10)
}

#[tokio::test]
async fn retrieval_prefers_the_relevant_chunk() {
    let provider = MockProvider;
    let texts: Vec<String> = vec![
        "Bananas are yellow fruit grown in warm climates".to_string(),
        "The capital of France is Paris, a major European city".to_string(),
        "Rust is a systems programming language".to_string(),
    ];
    let embeddings = provider.generate_batch_embeddings(&texts).await.unwrap();
    let index = VectorIndex::build(texts, embeddings).unwrap();

    let query = provider
        .generate_embedding("What is the capital of France?")
        .await
        .unwrap();
    let results = index.search(&query, 1);

    assert_eq!(results.len(), 1);
    assert!(results[0].text.contains("Paris"));
}

#[tokio::test]
async fn chunked_document_answers_a_question_end_to_end() {
    let document = "The capital of France is Paris. ".repeat(60);
    let chunks = split_text(&document, 200, 40);
    assert!(chunks.len() > 1);

    let provider = MockProvider;
    let embeddings = provider.generate_batch_embeddings(&chunks).await.unwrap();
    let index = VectorIndex::build(chunks, embeddings).unwrap();
    let mut engine = ChatEngine::new(index, Box::new(provider), 4, 10);

    let answer = engine.ask("What is the capital of France?").await.unwrap();
    assert!(answer.contains("Paris"));
    assert_eq!(engine.history().len(), 2);
}

#[tokio::test]
async fn evaluation_scores_matching_answers_near_one() {
    let mut engine = engine_over(&[CHAT_ANSWER]).await;

    let generator = QuestionGenerator::new(Box::new(MockProvider), 3000, 3);
    let questions = generator.generate("source text", 2).await.unwrap();
    assert_eq!(questions.len(), 2);

    let embedder = MockProvider;
    let judge = MockProvider;
    let evaluator = Evaluator::new(&embedder, Some(&judge));
    let results = evaluator.evaluate(&questions, &mut engine).await.unwrap();

    assert_eq!(results.len(), 2);
    for result in &results {
        // Expected answers equal the pipeline's answer, so every metric
        // should be at (or within float noise of) its maximum
        assert!(result.cosine_score.unwrap() > 0.99);
        assert!(result.embedding_f1.unwrap() > 0.99);
        assert!(result.bleu_score > 0.99);
        assert!(result.rouge_l_score > 0.99);
        assert_eq!(result.judge_score, Some(0.9));
    }
}

#[tokio::test]
async fn evaluation_without_a_judge_still_scores_everything_else() {
    let mut engine = engine_over(&[CHAT_ANSWER]).await;

    let generator = QuestionGenerator::new(Box::new(MockProvider), 3000, 3);
    let questions = generator.generate("source text", 1).await.unwrap();

    let embedder = MockProvider;
    let evaluator = Evaluator::new(&embedder, None);
    let results = evaluator.evaluate(&questions, &mut engine).await.unwrap();

    assert_eq!(results[0].judge_score, None);
    assert!(results[0].cosine_score.unwrap() > 0.99);
    assert!(results[0].bleu_score > 0.99);
}

/// Generator that never produces enough questions must fail after its
/// attempt budget instead of retrying forever.
#[derive(Clone)]
struct StingyProvider;

#[async_trait]
impl CompletionProvider for StingyProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok("Q1: The only question?\nA1: The only answer".to_string())
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(bag_of_words_embedding(text))
    }

    async fn get_model_info(&self) -> Result<String, ProviderError> {
        Ok("stingy".to_string())
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}

#[tokio::test]
async fn under_producing_generator_errors_after_bounded_retries() {
    let generator = QuestionGenerator::new(Box::new(StingyProvider), 3000, 2);
    let err = generator.generate("source text", 5).await.unwrap_err();

    match err {
        EvalError::InsufficientQuestions { wanted, got, attempts } => {
            assert_eq!((wanted, got, attempts), (5, 1, 2));
        }
        other => panic!("expected InsufficientQuestions, got {}", other),
    }
}
