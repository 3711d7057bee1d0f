use serde::Serialize;

use super::metrics;
use super::questions::{EvalError, EvalQuestion};
use crate::chat::ChatEngine;
use crate::index::cosine_similarity;
use crate::providers::CompletionProvider;

/// One scored question: the reference pair, the pipeline's answer, and every
/// metric that could be computed. Metrics that depend on an external call
/// hold `None` when that call failed; the others always carry a value.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub question: String,
    pub expected_answer: String,
    pub bot_response: String,
    pub cosine_score: Option<f32>,
    pub embedding_f1: Option<f32>,
    pub bleu_score: f32,
    pub rouge_l_score: f32,
    pub judge_score: Option<f32>,
}

/// Scores pipeline answers against reference answers. The embedder computes
/// similarity metrics; the judge, when configured, adds a model-graded score.
pub struct Evaluator<'a> {
    embedder: &'a (dyn CompletionProvider + Send + Sync),
    judge: Option<&'a (dyn CompletionProvider + Send + Sync)>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        embedder: &'a (dyn CompletionProvider + Send + Sync),
        judge: Option<&'a (dyn CompletionProvider + Send + Sync)>,
    ) -> Self {
        Self { embedder, judge }
    }

    /// Answer every question through the engine and score each answer with
    /// all metrics. Each metric is computed independently; one failing never
    /// blocks the others.
    pub async fn evaluate(
        &self,
        questions: &[EvalQuestion],
        engine: &mut ChatEngine,
    ) -> Result<Vec<EvaluationResult>, EvalError> {
        let mut results = Vec::with_capacity(questions.len());

        for item in questions {
            let bot_response = engine.ask(&item.question).await?;
            results.push(self.score(item, &bot_response).await);
        }

        Ok(results)
    }

    async fn score(&self, item: &EvalQuestion, bot_response: &str) -> EvaluationResult {
        let expected = item.expected_answer.as_str();

        let cosine_score = match self.sentence_cosine(expected, bot_response).await {
            Ok(score) => Some(score),
            Err(e) => {
                log::warn!("Cosine similarity unavailable: {}", e);
                None
            }
        };

        let embedding_f1 = match self.token_embedding_f1(expected, bot_response).await {
            Ok(score) => Some(score),
            Err(e) => {
                log::warn!("Embedding F1 unavailable: {}", e);
                None
            }
        };

        let judge_score = match self.judge {
            Some(judge) => self.judge_answer(judge, item, bot_response).await,
            None => None,
        };

        EvaluationResult {
            question: item.question.clone(),
            expected_answer: item.expected_answer.clone(),
            bot_response: bot_response.to_string(),
            cosine_score,
            embedding_f1,
            bleu_score: metrics::bleu(bot_response, expected),
            rouge_l_score: metrics::rouge_l(bot_response, expected),
            judge_score,
        }
    }

    async fn sentence_cosine(
        &self,
        expected: &str,
        actual: &str,
    ) -> Result<f32, crate::providers::ProviderError> {
        let expected_embedding = self.embedder.generate_embedding(expected).await?;
        let actual_embedding = self.embedder.generate_embedding(actual).await?;
        Ok(cosine_similarity(&expected_embedding, &actual_embedding))
    }

    async fn token_embedding_f1(
        &self,
        expected: &str,
        actual: &str,
    ) -> Result<f32, crate::providers::ProviderError> {
        let expected_tokens = metrics::tokenize(expected);
        let actual_tokens = metrics::tokenize(actual);
        if expected_tokens.is_empty() || actual_tokens.is_empty() {
            return Ok(0.0);
        }

        let expected_embeddings = self
            .embedder
            .generate_batch_embeddings(&expected_tokens)
            .await?;
        let actual_embeddings = self
            .embedder
            .generate_batch_embeddings(&actual_tokens)
            .await?;

        Ok(metrics::greedy_embedding_f1(
            &actual_embeddings,
            &expected_embeddings,
        ))
    }

    async fn judge_answer(
        &self,
        judge: &(dyn CompletionProvider + Send + Sync),
        item: &EvalQuestion,
        bot_response: &str,
    ) -> Option<f32> {
        let prompt = format!(
            "You are an expert evaluator.\n\n\
             Compare the expected answer and the student's answer for this \
             question. Return a score between 0 (worst) and 1 (perfect) based \
             strictly on relevance, correctness, and completeness.\n\n\
             QUESTION:\n{}\n\n\
             EXPECTED:\n{}\n\n\
             ANSWER:\n{}\n\n\
             Respond only with:\nScore: <value between 0 and 1>",
            item.question, item.expected_answer, bot_response
        );

        match judge.complete(&prompt).await {
            Ok(output) => {
                let score = metrics::parse_judge_score(&output);
                if score.is_none() {
                    log::warn!("Judge response had no parseable score: {}", output);
                }
                score
            }
            Err(e) => {
                log::warn!("Judge scoring failed: {}", e);
                None
            }
        }
    }
}
