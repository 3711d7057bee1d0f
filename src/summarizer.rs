use std::path::{Path, PathBuf};

use crate::providers::CompletionProvider;

/// Split text into sentence-bounded sections of at most `max_words` words.
/// A single sentence longer than the budget becomes its own section rather
/// than being cut mid-sentence.
pub fn split_into_sections(text: &str, max_words: usize) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for sentence in split_sentences(text) {
        let words = sentence.split_whitespace().count();
        if current_words + words > max_words && !current.is_empty() {
            sections.push(current.trim().to_string());
            current = String::new();
            current_words = 0;
        }
        current.push_str(&sentence);
        current.push(' ');
        current_words += words;
    }

    if !current.trim().is_empty() {
        sections.push(current.trim().to_string());
    }

    sections
}

/// Split on sentence-ending punctuation followed by whitespace, keeping the
/// punctuation with the sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if current.is_empty() && c.is_whitespace() {
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            if chars.peek().map_or(true, |next| next.is_whitespace()) {
                sentences.push(current.clone());
                current.clear();
            }
        }
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }

    sentences
}

fn section_prompt(section: &str) -> String {
    format!(
        "Summarize the following content concisely. Extract only the most \
         important, relevant facts or findings. Avoid repetition and \
         unnecessary detail. Be brief and clear.\n\n{}",
        section
    )
}

/// Summarize text section by section through the model.
///
/// A section that fails to summarize contributes a bracketed placeholder so
/// one bad model call never sinks the whole summary.
pub async fn summarize_text(
    provider: &(dyn CompletionProvider + Send + Sync),
    text: &str,
    max_section_words: usize,
) -> String {
    let sections = split_into_sections(text, max_section_words);
    log::info!("Summarizing {} sections", sections.len());

    let mut summaries = Vec::with_capacity(sections.len());
    for (i, section) in sections.iter().enumerate() {
        match provider.complete(&section_prompt(section)).await {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                log::warn!("Section {} failed to summarize: {}", i + 1, e);
                summaries.push(format!("[Failed to summarize section {}: {}]", i + 1, e));
            }
        }
    }

    summaries.join("\n\n")
}

/// Write the summary next to the source file as `<stem>_summary.txt`.
pub fn save_summary(source: &Path, summary: &str) -> std::io::Result<PathBuf> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let out_path = source.with_file_name(format!("{}_summary.txt", stem));
    std::fs::write(&out_path, summary)?;
    Ok(out_path)
}
