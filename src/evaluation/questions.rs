use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::ChatError;
use crate::providers::{CompletionProvider, ProviderError};

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Question generator is not configured, set COHERE_API_KEY")]
    GeneratorUnavailable,
    #[error("Generated only {got} of {wanted} questions after {attempts} attempts")]
    InsufficientQuestions {
        wanted: usize,
        got: usize,
        attempts: usize,
    },
    #[error("Model backend error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Answering failed: {0}")]
    Chat(#[from] ChatError),
}

/// A reference question with the answer the generator considers ideal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalQuestion {
    pub question: String,
    pub expected_answer: String,
}

/// Generates reference question/answer pairs from source text through a
/// hosted model, retrying under-production up to a fixed attempt budget.
pub struct QuestionGenerator {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    text_budget: usize,
    max_attempts: usize,
}

impl QuestionGenerator {
    pub fn new(
        provider: Box<dyn CompletionProvider + Send + Sync>,
        text_budget: usize,
        max_attempts: usize,
    ) -> Self {
        Self {
            provider,
            text_budget,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn generate(
        &self,
        text: &str,
        count: usize,
    ) -> Result<Vec<EvalQuestion>, EvalError> {
        let excerpt = truncate_chars(text, self.text_budget);
        let prompt = build_prompt(excerpt, count);

        let mut best: Vec<EvalQuestion> = Vec::new();
        for attempt in 1..=self.max_attempts {
            let response = self.provider.complete(&prompt).await?;
            let mut pairs = parse_qa_pairs(&response);
            pairs.truncate(count);

            if pairs.len() > best.len() {
                best = pairs;
            }
            if best.len() >= count {
                return Ok(best);
            }

            log::warn!(
                "Attempt {}/{} produced {} of {} questions",
                attempt,
                self.max_attempts,
                best.len(),
                count
            );
        }

        Err(EvalError::InsufficientQuestions {
            wanted: count,
            got: best.len(),
            attempts: self.max_attempts,
        })
    }
}

fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn build_prompt(excerpt: &str, count: usize) -> String {
    format!(
        "You are an academic assistant.\n\n\
         Generate exactly {count} content-specific question-answer pairs from \
         the text below. Only ask questions based strictly on the content. \
         Avoid general knowledge. Ensure the response has exactly {count} \
         question-answer pairs.\n\n\
         TEXT:\n{excerpt}\n\n\
         FORMAT:\n\
         Q1: <question>\n\
         A1: <ideal answer>\n\
         Q2: <question>\n\
         A2: <ideal answer>\n\n\
         Only return the Qn/An pairs in the format above. No explanation."
    )
}

/// Pair each `Qn:` line with the `An:` line that follows it. Lines that do
/// not match the expected shape are skipped.
pub fn parse_qa_pairs(output: &str) -> Vec<EvalQuestion> {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut pairs = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        if is_tagged(lines[i], 'Q') && is_tagged(lines[i + 1], 'A') {
            let question = after_colon(lines[i]);
            let answer = after_colon(lines[i + 1]);
            if !question.is_empty() && !answer.is_empty() {
                pairs.push(EvalQuestion {
                    question,
                    expected_answer: answer,
                });
            }
            i += 2;
        } else {
            log::debug!("Skipping unparseable line: {}", lines[i]);
            i += 1;
        }
    }

    pairs
}

fn is_tagged(line: &str, tag: char) -> bool {
    let Some(rest) = line.strip_prefix(tag) else {
        return false;
    };
    match rest.find(':') {
        Some(pos) => rest[..pos].chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

fn after_colon(line: &str) -> String {
    line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn parses_well_formed_pairs() {
        let output = "Q1: What is the capital of France?\n\
                      A1: Paris\n\
                      Q2: What river runs through it?\n\
                      A2: The Seine";
        let pairs = parse_qa_pairs(output);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What is the capital of France?");
        assert_eq!(pairs[1].expected_answer, "The Seine");
    }

    #[test]
    fn skips_lines_outside_the_format() {
        let output = "Here are your questions:\n\
                      Q1: A question?\n\
                      A1: An answer\n\
                      Hope that helps!";
        let pairs = parse_qa_pairs(output);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn unnumbered_tags_still_parse() {
        let output = "Q: One?\nA: Yes";
        assert_eq!(parse_qa_pairs(output).len(), 1);
    }

    #[test]
    fn orphan_question_lines_are_dropped() {
        let output = "Q1: First?\nQ2: Second?\nA2: Only this one has an answer";
        let pairs = parse_qa_pairs(output);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "Second?");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "ñ".repeat(10);
        assert_eq!(truncate_chars(&text, 3).chars().count(), 3);
        assert_eq!(truncate_chars(&text, 100), text.as_str());
    }

    #[derive(Clone)]
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        response: String,
    }

    #[async_trait::async_trait]
    impl CompletionProvider for CountingProvider {
        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            Err(ProviderError::Unsupported("CountingProvider", "embeddings"))
        }

        async fn get_model_info(&self) -> Result<String, ProviderError> {
            Ok("counting".to_string())
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn under_production_stops_after_the_attempt_budget() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: Arc::clone(&calls),
            response: "Q1: Only one?\nA1: Yes".to_string(),
        };
        let generator = QuestionGenerator::new(Box::new(provider), 3000, 3);

        let err = generator.generate("some text", 5).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            EvalError::InsufficientQuestions { wanted, got, attempts } => {
                assert_eq!(wanted, 5);
                assert_eq!(got, 1);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn full_production_returns_on_the_first_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: Arc::clone(&calls),
            response: "Q1: One?\nA1: a\nQ2: Two?\nA2: b".to_string(),
        };
        let generator = QuestionGenerator::new(Box::new(provider), 3000, 3);

        let pairs = generator.generate("some text", 2).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
