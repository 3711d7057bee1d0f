use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

use super::VoiceError;
use crate::language::Language;

/// Transcribe one recorded WAV utterance through the speech recognition
/// service and return the transcript of the top alternative.
pub async fn transcribe_wav(
    path: &Path,
    api_key: &str,
    lang: Language,
    timeout: Duration,
) -> Result<String, VoiceError> {
    let audio = std::fs::read(path)?;
    let content = base64::engine::general_purpose::STANDARD.encode(&audio);

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(VoiceError::Http)?;

    let response = client
        .post(format!(
            "https://speech.googleapis.com/v1/speech:recognize?key={}",
            api_key
        ))
        .json(&json!({
            "config": { "languageCode": lang.speech_locale() },
            "audio": { "content": content }
        }))
        .send()
        .await
        .map_err(VoiceError::Http)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VoiceError::Service {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response.json().await.map_err(VoiceError::Http)?;

    body.get("results")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("alternatives"))
        .and_then(|a| a.get(0))
        .and_then(|a| a.get("transcript"))
        .and_then(|t| t.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(VoiceError::NoSpeech)
}
