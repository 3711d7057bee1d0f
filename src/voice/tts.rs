use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use super::VoiceError;
use crate::language::Language;

// The synthesis endpoint rejects long query strings, so text is spoken in
// pieces and the MP3 frames concatenated.
const MAX_PIECE_CHARS: usize = 200;

lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref UNDERLINE: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref BULLETS: Regex = Regex::new(r"(?m)^\s*[*\-•]+\s*").unwrap();
    static ref LEFTOVER: Regex = Regex::new(r"[•*_~`>#]").unwrap();
}

/// Strip markdown formatting and bullet noise so the synthesized speech does
/// not read asterisks out loud.
pub fn clean_text_for_speech(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = UNDERLINE.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = BULLETS.replace_all(&text, "");
    let text = LEFTOVER.replace_all(&text, "");
    text.trim().to_string()
}

fn split_into_pieces(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars + word_chars + 1 > max_chars && !current.is_empty() {
            pieces.push(current.clone());
            current.clear();
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Fetch synthesized MP3 audio for the text in the given language.
pub async fn synthesize(
    text: &str,
    lang: Language,
    timeout: Duration,
) -> Result<Vec<u8>, VoiceError> {
    let cleaned = clean_text_for_speech(text);
    if cleaned.is_empty() {
        return Err(VoiceError::EmptyText);
    }

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(VoiceError::Http)?;

    let pieces = split_into_pieces(&cleaned, MAX_PIECE_CHARS);
    log::info!("Synthesizing {} audio pieces", pieces.len());

    let mut audio = Vec::new();
    for piece in &pieces {
        let url = format!(
            "https://translate.google.com/translate_tts?ie=UTF-8&client=tw-ob&tl={}&q={}",
            lang.code(),
            urlencoding::encode(piece)
        );

        let response = client.get(&url).send().await.map_err(VoiceError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Service {
                status: status.as_u16(),
                body,
            });
        }

        audio.extend_from_slice(&response.bytes().await.map_err(VoiceError::Http)?);
    }

    Ok(audio)
}

/// Write the audio to a temp file and return its path.
pub fn save_speech(audio: &[u8]) -> Result<PathBuf, VoiceError> {
    let path = std::env::temp_dir().join(format!("answer-{}.mp3", Uuid::new_v4()));
    std::fs::write(&path, audio)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_emphasis() {
        assert_eq!(clean_text_for_speech("**bold** and *italic*"), "bold and italic");
        assert_eq!(clean_text_for_speech("__underlined__ text"), "underlined text");
    }

    #[test]
    fn strips_bullets_and_leftover_symbols() {
        let cleaned = clean_text_for_speech("- first point\n• second point\n## header");
        assert!(!cleaned.contains('-') || !cleaned.starts_with('-'));
        assert!(!cleaned.contains('•'));
        assert!(!cleaned.contains('#'));
        assert!(cleaned.contains("first point"));
        assert!(cleaned.contains("second point"));
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(
            clean_text_for_speech("The capital of France is Paris."),
            "The capital of France is Paris."
        );
    }

    #[test]
    fn pieces_respect_the_length_cap() {
        let text = "word ".repeat(200);
        for piece in split_into_pieces(&text, 50) {
            assert!(piece.chars().count() <= 50);
        }
    }

    #[test]
    fn short_text_is_a_single_piece() {
        assert_eq!(split_into_pieces("hello there", 200).len(), 1);
    }
}
