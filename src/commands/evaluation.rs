use colored::Colorize;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::chart;
use crate::chat::ChatEngine;
use crate::config::Settings;
use crate::evaluation::{EvaluationResult, Evaluator, QuestionGenerator};
use crate::practice;
use crate::providers::CompletionProvider;

/// Generate reference questions from the source text, answer them through the
/// pipeline, and score every answer with each metric.
pub async fn run_evaluation(
    settings: &Settings,
    provider: &Box<dyn CompletionProvider + Send + Sync>,
    generator: &Box<dyn CompletionProvider + Send + Sync>,
    engine: &ChatEngine,
    text: &str,
    count: usize,
) -> Result<Vec<EvaluationResult>, String> {
    println!("🧪 Generating {} questions and evaluating...", count);

    let question_generator = QuestionGenerator::new(
        generator.clone(),
        settings.eval_text_budget,
        settings.eval_max_attempts,
    );
    let questions = question_generator
        .generate(text, count)
        .await
        .map_err(|e| e.to_string())?;

    // Answer against a fork so scoring never touches the live conversation
    let mut fork = engine.fork();
    let evaluator = Evaluator::new(provider.as_ref(), Some(generator.as_ref()));
    let results = evaluator
        .evaluate(&questions, &mut fork)
        .await
        .map_err(|e| e.to_string())?;

    println!("\n📊 Scores per question:\n");
    println!("{}", chart::render_score_chart(&results));

    for (i, result) in results.iter().enumerate() {
        println!("{}", format!("Q{}: {}", i + 1, result.question).bold());
        println!("  Expected: {}", result.expected_answer.dimmed());
        println!("  Answered: {}", result.bot_response.bright_green());
    }

    Ok(results)
}

/// Quiz the user: ask each generated question, collect their answers, and
/// score them by embedding similarity with a feedback report.
pub async fn run_practice(
    settings: &Settings,
    provider: &Box<dyn CompletionProvider + Send + Sync>,
    generator: &Box<dyn CompletionProvider + Send + Sync>,
    text: &str,
    count: usize,
) -> Result<(), String> {
    println!("🧠 Generating {} practice questions...", count);

    let question_generator = QuestionGenerator::new(
        generator.clone(),
        settings.eval_text_budget,
        settings.eval_max_attempts,
    );
    let questions = question_generator
        .generate(text, count)
        .await
        .map_err(|e| e.to_string())?;

    let mut rl = Editor::<(), DefaultHistory>::new()
        .map_err(|e| format!("Failed to open input: {}", e))?;

    let mut answers = Vec::with_capacity(questions.len());
    for (i, item) in questions.iter().enumerate() {
        println!("\n{}", format!("Q{}: {}", i + 1, item.question).bold());
        let answer = rl
            .readline("✍️  ")
            .map_err(|e| format!("Input aborted: {}", e))?;
        answers.push(answer.trim().to_string());
    }

    println!("\n🔍 Scoring your answers...");
    let (results, feedback, percentage) =
        practice::score_answers(provider.as_ref(), &questions, &answers)
            .await
            .map_err(|e| e.to_string())?;

    println!();
    for (i, result) in results.iter().enumerate() {
        let score_str = format!("{:.2}", result.score);
        let colored_score = if result.score < practice::WEAK_SCORE_THRESHOLD {
            score_str.red()
        } else {
            score_str.green()
        };
        println!("{} Score: {}", format!("Q{}:", i + 1).bold(), colored_score);
        println!("  Expected: {}", result.expected_answer.dimmed());
    }

    println!("\n🎯 Overall score: {}%", percentage.to_string().cyan());
    println!("\n{}", feedback);

    Ok(())
}
