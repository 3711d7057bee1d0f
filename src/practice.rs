use serde::Serialize;

use crate::evaluation::questions::{EvalError, EvalQuestion};
use crate::index::cosine_similarity;
use crate::providers::CompletionProvider;

/// Answers below this similarity count as weak areas in the feedback report.
pub const WEAK_SCORE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct PracticeResult {
    pub question: String,
    pub expected_answer: String,
    pub user_answer: String,
    pub score: f32,
}

/// Score the user's own answers against the expected answers by embedding
/// similarity. A missing or empty answer scores 0 without a model call.
pub async fn score_answers(
    embedder: &(dyn CompletionProvider + Send + Sync),
    questions: &[EvalQuestion],
    answers: &[String],
) -> Result<(Vec<PracticeResult>, String, f32), EvalError> {
    let mut results = Vec::with_capacity(questions.len());
    let mut total = 0.0f32;

    for (i, item) in questions.iter().enumerate() {
        let user_answer = answers.get(i).map(String::as_str).unwrap_or("").trim();

        let score = if user_answer.is_empty() {
            0.0
        } else {
            let expected = embedder.generate_embedding(&item.expected_answer).await?;
            let given = embedder.generate_embedding(user_answer).await?;
            cosine_similarity(&expected, &given)
        };

        total += score;
        results.push(PracticeResult {
            question: item.question.clone(),
            expected_answer: item.expected_answer.clone(),
            user_answer: user_answer.to_string(),
            score,
        });
    }

    let percentage = if results.is_empty() {
        0.0
    } else {
        (total / results.len() as f32 * 100.0 * 100.0).round() / 100.0
    };
    let feedback = generate_feedback(&results);

    Ok((results, feedback, percentage))
}

/// Point the user at the questions they answered weakly.
pub fn generate_feedback(results: &[PracticeResult]) -> String {
    let weak_areas: Vec<&str> = results
        .iter()
        .filter(|r| r.score < WEAK_SCORE_THRESHOLD)
        .map(|r| r.question.as_str())
        .collect();

    if weak_areas.is_empty() {
        return "✅ Excellent work! You answered all questions accurately. \
                Keep practicing to retain the knowledge."
            .to_string();
    }

    format!(
        "⚠️ Focus on the following areas where your answers were weaker:\n\n{}\n\n\
         📌 Consider revisiting those topics in your PDF for better understanding.",
        weak_areas
            .iter()
            .map(|q| format!("• {}", q))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(question: &str, score: f32) -> PracticeResult {
        PracticeResult {
            question: question.to_string(),
            expected_answer: String::new(),
            user_answer: String::new(),
            score,
        }
    }

    #[test]
    fn strong_answers_get_positive_feedback() {
        let feedback = generate_feedback(&[result("Q1", 0.9), result("Q2", 0.7)]);
        assert!(feedback.contains("Excellent work"));
    }

    #[test]
    fn weak_answers_are_listed() {
        let feedback = generate_feedback(&[result("Strong one", 0.9), result("Weak one", 0.2)]);
        assert!(feedback.contains("Weak one"));
        assert!(!feedback.contains("• Strong one"));
    }
}
