use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target languages the assistant can translate and speak answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    French,
    Spanish,
    Bengali,
    Tamil,
    Telugu,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::English,
            Language::Hindi,
            Language::French,
            Language::Spanish,
            Language::Bengali,
            Language::Tamil,
            Language::Telugu,
        ]
    }

    /// ISO 639-1 code used by the translation and speech services.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Bengali => "bn",
            Language::Tamil => "ta",
            Language::Telugu => "te",
        }
    }

    /// Locale string for the speech recognition service.
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::French => "fr-FR",
            Language::Spanish => "es-ES",
            Language::Bengali => "bn-IN",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Bengali => "Bengali",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
        }
    }

    pub fn from_detected(lang: whatlang::Lang) -> Option<Language> {
        match lang {
            whatlang::Lang::Eng => Some(Language::English),
            whatlang::Lang::Hin => Some(Language::Hindi),
            whatlang::Lang::Fra => Some(Language::French),
            whatlang::Lang::Spa => Some(Language::Spanish),
            whatlang::Lang::Ben => Some(Language::Bengali),
            whatlang::Lang::Tam => Some(Language::Tamil),
            whatlang::Lang::Tel => Some(Language::Telugu),
            _ => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::all()
            .iter()
            .find(|lang| lang.name().to_lowercase() == wanted || lang.code() == wanted)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown language: {}. Supported: {}",
                    s,
                    Language::all()
                        .iter()
                        .map(|l| l.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}
