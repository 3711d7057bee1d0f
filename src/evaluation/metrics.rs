use std::collections::HashMap;

use crate::index::cosine_similarity;

/// Lowercased alphanumeric word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// BLEU score of a candidate against a single reference: geometric mean of
/// clipped n-gram precisions (orders 1 up to 4, capped by the shorter text)
/// with a brevity penalty. Identical texts score 1.0.
pub fn bleu(candidate: &str, reference: &str) -> f32 {
    let cand = tokenize(candidate);
    let refr = tokenize(reference);
    if cand.is_empty() || refr.is_empty() {
        return 0.0;
    }

    let max_n = 4.min(cand.len()).min(refr.len());
    let mut log_precision_sum = 0.0f64;

    for n in 1..=max_n {
        let cand_counts = ngram_counts(&cand, n);
        let ref_counts = ngram_counts(&refr, n);

        let clipped: usize = cand_counts
            .iter()
            .map(|(gram, count)| (*count).min(ref_counts.get(gram).copied().unwrap_or(0)))
            .sum();
        let total: usize = cand_counts.values().sum();

        if clipped == 0 {
            return 0.0;
        }
        log_precision_sum += (clipped as f64 / total as f64).ln();
    }

    let precision = (log_precision_sum / max_n as f64).exp();
    let brevity_penalty = if cand.len() >= refr.len() {
        1.0
    } else {
        (1.0 - refr.len() as f64 / cand.len() as f64).exp()
    };

    (precision * brevity_penalty) as f32
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// ROUGE-L: F-measure over the longest common subsequence of word tokens.
pub fn rouge_l(candidate: &str, reference: &str) -> f32 {
    let cand = tokenize(candidate);
    let refr = tokenize(reference);
    if cand.is_empty() || refr.is_empty() {
        return 0.0;
    }

    let lcs = lcs_length(&cand, &refr);
    if lcs == 0 {
        return 0.0;
    }

    let precision = lcs as f32 / cand.len() as f32;
    let recall = lcs as f32 / refr.len() as f32;
    2.0 * precision * recall / (precision + recall)
}

/// Embedding-based F1 over token embeddings: each candidate token greedily
/// matches its most similar reference token (precision) and vice versa
/// (recall). Identical token sequences score 1.0.
pub fn greedy_embedding_f1(candidate: &[Vec<f32>], reference: &[Vec<f32>]) -> f32 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let best_match_mean = |from: &[Vec<f32>], to: &[Vec<f32>]| -> f32 {
        let sum: f32 = from
            .iter()
            .map(|a| {
                to.iter()
                    .map(|b| cosine_similarity(a, b))
                    .fold(f32::MIN, f32::max)
            })
            .sum();
        sum / from.len() as f32
    };

    let precision = best_match_mean(candidate, reference);
    let recall = best_match_mean(reference, candidate);
    if precision + recall <= 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// Parse a numeric score out of a `Score: <value>` model response, clamped
/// to [0, 1]. Returns `None` when no score can be read.
pub fn parse_judge_score(output: &str) -> Option<f32> {
    let tail = output.split("Score:").nth(1)?;
    let number: String = tail
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse::<f32>().ok().map(|v| v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_one_on_bleu_and_rouge() {
        let text = "The capital of France is Paris";
        assert!((bleu(text, text) - 1.0).abs() < 1e-6);
        assert!((rouge_l(text, text) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_texts_score_zero() {
        assert_eq!(bleu("alpha beta gamma delta", "epsilon zeta eta theta"), 0.0);
        assert_eq!(rouge_l("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn bleu_penalizes_short_candidates() {
        let reference = "the quick brown fox jumps over the lazy dog";
        let full = bleu(reference, reference);
        let partial = bleu("the quick brown fox", reference);
        assert!(partial < full);
        assert!(partial > 0.0);
    }

    #[test]
    fn rouge_rewards_subsequence_overlap() {
        let score = rouge_l("the cat sat on the mat", "the cat lay on the mat");
        assert!(score > 0.5 && score < 1.0);
    }

    #[test]
    fn empty_candidate_scores_zero() {
        assert_eq!(bleu("", "reference text"), 0.0);
        assert_eq!(rouge_l("", "reference text"), 0.0);
    }

    #[test]
    fn identical_embeddings_give_unit_f1() {
        let embs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert!((greedy_embedding_f1(&embs, &embs) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_embeddings_give_zero_f1() {
        let a = vec![vec![1.0, 0.0]];
        let b = vec![vec![0.0, 1.0]];
        assert_eq!(greedy_embedding_f1(&a, &b), 0.0);
    }

    #[test]
    fn judge_score_parses_and_clamps() {
        assert_eq!(parse_judge_score("Score: 0.85"), Some(0.85));
        assert_eq!(parse_judge_score("Score: 7"), Some(1.0));
        assert_eq!(parse_judge_score("the answer is good"), None);
        assert_eq!(parse_judge_score("Score: high"), None);
    }

    #[test]
    fn tokenize_strips_punctuation_and_case() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
    }
}
