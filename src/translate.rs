use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::language::Language;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation request failed: {0}")]
    Http(reqwest::Error),
    #[error("Translation service error: status {status}, body: {body}")]
    Service { status: u16, body: String },
    #[error("Translation service returned an unexpected response shape")]
    Format,
}

/// Translate text into the target language.
///
/// When language detection already identifies the text as the target
/// language the service call is skipped and the text returned as-is.
pub async fn translate_text(
    text: &str,
    target: Language,
    timeout: Duration,
) -> Result<String, TranslateError> {
    if let Some(info) = whatlang::detect(text) {
        if info.is_reliable() && Language::from_detected(info.lang()) == Some(target) {
            log::info!("Text already in {}, skipping translation", target);
            return Ok(text.to_string());
        }
    }

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(TranslateError::Http)?;

    let url = format!(
        "https://translate.googleapis.com/translate_a/single?client=gtx&sl=auto&tl={}&dt=t&q={}",
        target.code(),
        urlencoding::encode(text)
    );

    let response = client.get(&url).send().await.map_err(TranslateError::Http)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TranslateError::Service {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response.json().await.map_err(TranslateError::Http)?;

    // Response shape: [[["<translated>", "<source>", ...], ...], ...]
    let segments = body.get(0).and_then(|v| v.as_array()).ok_or(TranslateError::Format)?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(|p| p.as_str()) {
            translated.push_str(piece);
        }
    }

    if translated.is_empty() {
        return Err(TranslateError::Format);
    }

    Ok(translated)
}
