use colored::Colorize;

use crate::evaluation::EvaluationResult;

const BAR_WIDTH: usize = 30;

fn bar(score: f32) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn metric_row(label: &str, score: Option<f32>) -> String {
    match score {
        Some(value) => format!(
            "  {:<12} {} {:.3}",
            label,
            bar(value),
            value
        ),
        None => format!("  {:<12} {} {}", label, "░".repeat(BAR_WIDTH).dimmed(), "n/a".dimmed()),
    }
}

/// Render per-question metric scores as a terminal bar chart, followed by
/// the average of each metric across all questions.
pub fn render_score_chart(results: &[EvaluationResult]) -> String {
    let mut out = String::new();

    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{} {}\n",
            format!("Q{}:", i + 1).bold(),
            result.question
        ));
        out.push_str(&format!("{}\n", metric_row("Cosine", result.cosine_score).cyan()));
        out.push_str(&format!("{}\n", metric_row("Emb-F1", result.embedding_f1).green()));
        out.push_str(&format!("{}\n", metric_row("BLEU", Some(result.bleu_score)).yellow()));
        out.push_str(&format!("{}\n", metric_row("ROUGE-L", Some(result.rouge_l_score)).magenta()));
        out.push_str(&format!("{}\n", metric_row("Judge", result.judge_score).blue()));
        out.push('\n');
    }

    out.push_str(&format!("{}\n", "Averages".bold()));
    out.push_str(&average_rows(results));
    out
}

fn average_rows(results: &[EvaluationResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        metric_row("Cosine", average(results.iter().map(|r| r.cosine_score))).cyan()
    ));
    out.push_str(&format!(
        "{}\n",
        metric_row("Emb-F1", average(results.iter().map(|r| r.embedding_f1))).green()
    ));
    out.push_str(&format!(
        "{}\n",
        metric_row("BLEU", average(results.iter().map(|r| Some(r.bleu_score)))).yellow()
    ));
    out.push_str(&format!(
        "{}\n",
        metric_row("ROUGE-L", average(results.iter().map(|r| Some(r.rouge_l_score)))).magenta()
    ));
    out.push_str(&format!(
        "{}\n",
        metric_row("Judge", average(results.iter().map(|r| r.judge_score))).blue()
    ));
    out
}

/// Mean over the present values; `None` when no question produced the metric.
fn average<I: Iterator<Item = Option<f32>>>(scores: I) -> Option<f32> {
    let present: Vec<f32> = scores.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f32>() / present.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(bleu: f32, judge: Option<f32>) -> EvaluationResult {
        EvaluationResult {
            question: "What is it?".to_string(),
            expected_answer: "A thing".to_string(),
            bot_response: "A thing".to_string(),
            cosine_score: Some(1.0),
            embedding_f1: Some(1.0),
            bleu_score: bleu,
            rouge_l_score: 1.0,
            judge_score: judge,
        }
    }

    #[test]
    fn chart_lists_every_question_and_metric() {
        let chart = render_score_chart(&[result(1.0, Some(0.9)), result(0.5, None)]);
        assert!(chart.contains("Q1:"));
        assert!(chart.contains("Q2:"));
        assert!(chart.contains("BLEU"));
        assert!(chart.contains("ROUGE-L"));
        assert!(chart.contains("Averages"));
    }

    #[test]
    fn missing_metrics_render_as_not_available() {
        let chart = render_score_chart(&[result(1.0, None)]);
        assert!(chart.contains("n/a"));
    }

    #[test]
    fn average_ignores_missing_values() {
        let scores = vec![Some(1.0), None, Some(0.5)];
        assert_eq!(average(scores.into_iter()), Some(0.75));
    }

    #[test]
    fn full_bar_at_unit_score() {
        assert_eq!(bar(1.0).matches('█').count(), BAR_WIDTH);
        assert_eq!(bar(0.0).matches('░').count(), BAR_WIDTH);
    }
}
