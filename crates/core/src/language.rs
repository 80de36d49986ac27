//! Language definitions
//!
//! The service operates in English with Spanish and Polish as the two
//! supported translation targets. English is the canonical storage form:
//! query history and the fallback cache always hold English text.

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    Polish,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::Polish => "pl",
        }
    }

    /// Get human-readable name (lowercase, as used in API payloads)
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::Polish => "polish",
        }
    }

    /// Parse from string (case-insensitive, accepts codes, English names
    /// and native names)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" | "inglés" | "ingles" => Some(Self::English),
            "es" | "spa" | "spanish" | "español" | "espanol" => Some(Self::Spanish),
            "pl" | "pol" | "polish" | "polski" => Some(Self::Polish),
            _ => None,
        }
    }

}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
