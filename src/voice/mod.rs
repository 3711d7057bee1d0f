pub mod stt;
pub mod tts;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Nothing to say, the text is empty after cleanup")]
    EmptyText,
    #[error("Audio file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Speech service request failed: {0}")]
    Http(reqwest::Error),
    #[error("Speech service error: status {status}, body: {body}")]
    Service { status: u16, body: String },
    #[error("No speech could be recognized in the recording")]
    NoSpeech,
    #[error("GOOGLE_SPEECH_API_KEY not configured")]
    MissingKey,
}

pub use stt::transcribe_wav;
pub use tts::{clean_text_for_speech, save_speech, synthesize};
