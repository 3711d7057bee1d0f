use colored::Colorize;
use std::path::Path;

use crate::config::Settings;
use crate::language::Language;
use crate::voice;

/// Synthesize speech for the text and report where the audio landed.
pub async fn speak(text: &str, lang: Language, settings: &Settings) -> Result<(), String> {
    println!("🔊 Synthesizing speech ({})...", lang);

    let audio = voice::synthesize(text, lang, settings.request_timeout)
        .await
        .map_err(|e| format!("Text-to-speech error: {}", e))?;
    let path = voice::save_speech(&audio).map_err(|e| format!("Text-to-speech error: {}", e))?;

    println!("🎵 Audio saved to {}", path.display().to_string().bright_green());
    Ok(())
}

/// Transcribe a recorded utterance; recognition failures come back as an
/// error string rather than ending the session.
pub async fn transcribe(path: &str, lang: Language, settings: &Settings) -> Result<String, String> {
    let api_key = settings
        .speech_api_key
        .as_deref()
        .ok_or_else(|| crate::voice::VoiceError::MissingKey.to_string())?;

    println!("🎙️ Transcribing {}...", path.bright_yellow());

    voice::transcribe_wav(Path::new(path), api_key, lang, settings.request_timeout)
        .await
        .map_err(|e| format!("Error: {}", e))
}
