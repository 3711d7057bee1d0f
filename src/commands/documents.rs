use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::chat::ChatEngine;
use crate::config::Settings;
use crate::index::{split_text, VectorIndex};
use crate::ingestion::{extract_text_from_pdfs, IngestReport};
use crate::providers::CompletionProvider;
use crate::summarizer;

/// Ingest a batch of PDFs and build a fresh chat session over them. The
/// previous index and conversation are discarded by the caller replacing its
/// session with the returned engine.
pub async fn process(
    settings: &Settings,
    provider: &Box<dyn CompletionProvider + Send + Sync>,
    paths: &[&str],
) -> Result<(ChatEngine, String, IngestReport), String> {
    println!("📂 Reading {} file(s)...", paths.len());

    let report = extract_text_from_pdfs(paths).map_err(|e| e.to_string())?;
    for (path, reason) in &report.skipped {
        println!("⚠️ Skipped {}: {}", path.display().to_string().yellow(), reason);
    }

    let chunks = split_text(&report.text, settings.chunk_size, settings.chunk_overlap);
    println!("🔹 Split into {} chunks, embedding...", chunks.len());

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}")
            .unwrap(),
    );

    let mut embeddings = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let embedding = provider
            .generate_embedding(chunk)
            .await
            .map_err(|e| format!("Embedding failed: {}", e))?;
        embeddings.push(embedding);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let index = VectorIndex::build(chunks, embeddings).map_err(|e| e.to_string())?;
    let engine = ChatEngine::new(
        index,
        provider.clone(),
        settings.top_k,
        settings.history_window,
    );

    Ok((engine, report.text.clone(), report))
}

/// Summarize one PDF and write the summary next to it.
pub async fn summarize(
    settings: &Settings,
    provider: &Box<dyn CompletionProvider + Send + Sync>,
    path: &str,
) -> Result<(), String> {
    println!("📝 Summarizing: {}", path.bright_yellow());

    let report = extract_text_from_pdfs(&[path]).map_err(|e| e.to_string())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Summarizing sections...");

    let summary =
        summarizer::summarize_text(provider.as_ref(), &report.text, settings.summary_section_words)
            .await;
    pb.finish_and_clear();

    println!("\n📋 Summary:");
    println!("{}", summary.bright_green());

    match summarizer::save_summary(Path::new(path), &summary) {
        Ok(out_path) => println!("\n📥 Saved to {}", out_path.display()),
        Err(e) => println!("{}", format!("⚠️ Could not save summary: {}", e).yellow()),
    }

    Ok(())
}
