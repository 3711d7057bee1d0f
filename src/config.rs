use std::env;
use std::time::Duration;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Settings {
    // Chunking and retrieval
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub history_window: usize,

    // Local model server (generation + embeddings)
    pub ollama_url: String,
    pub chat_model: String,
    pub embed_model: String,

    // Hosted model API (question generation, judging, summaries)
    pub cohere_api_key: Option<String>,
    pub cohere_url: String,
    pub cohere_model: String,

    // Speech recognition
    pub speech_api_key: Option<String>,

    // External call budget
    pub request_timeout: Duration,

    // Evaluation
    pub eval_questions: usize,
    pub eval_text_budget: usize,
    pub eval_max_attempts: usize,

    // Summarization
    pub summary_section_words: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Self {
            chunk_size: env_parse("CHUNK_SIZE", 1000),
            chunk_overlap: env_parse("CHUNK_OVERLAP", 200),
            top_k: env_parse("TOP_K", 4),
            history_window: env_parse("HISTORY_WINDOW", 10),

            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gemma3:1b".to_string()),
            embed_model: env::var("EMBED_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),

            cohere_api_key: env::var("COHERE_API_KEY").ok().filter(|k| !k.is_empty()),
            cohere_url: env::var("COHERE_API_URL")
                .unwrap_or_else(|_| "https://api.cohere.com/v1/generate".to_string()),
            cohere_model: env::var("COHERE_MODEL")
                .unwrap_or_else(|_| "command-r-plus".to_string()),

            speech_api_key: env::var("GOOGLE_SPEECH_API_KEY").ok().filter(|k| !k.is_empty()),

            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 120)),

            eval_questions: env_parse("EVAL_QUESTIONS", 5),
            eval_text_budget: env_parse("EVAL_TEXT_BUDGET", 3000),
            eval_max_attempts: env_parse("EVAL_MAX_ATTEMPTS", 3),

            summary_section_words: env_parse("SUMMARY_SECTION_WORDS", 500),
        };

        // Overlap must leave room to advance or chunking cannot terminate
        if settings.chunk_overlap >= settings.chunk_size {
            log::warn!(
                "CHUNK_OVERLAP {} >= CHUNK_SIZE {}, resetting to defaults",
                settings.chunk_overlap,
                settings.chunk_size
            );
            settings.chunk_size = 1000;
            settings.chunk_overlap = 200;
        }

        settings
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_pipeline_constants() {
        let settings = Settings::from_env();
        assert!(settings.chunk_overlap < settings.chunk_size);
        assert!(settings.eval_max_attempts >= 1);
        assert!(settings.request_timeout.as_secs() > 0);
    }
}
