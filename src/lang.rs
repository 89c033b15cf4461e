//! Language handling for the evaluation pipeline.
//!
//! The QA-based protocol depends on English-specific resources (the POS
//! pattern library, article stripping in answer normalization, the QG/QA
//! model). The gate is exact: only the literal code `"en"` is accepted, and
//! anything else, including regional variants like `"en-US"`, is rejected
//! before models are loaded.

use crate::{Error, Result};

/// Languages understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// English.
    English,
    /// Any other language; parsed but not scoreable.
    Other,
}

impl Language {
    /// Parse a language code. Only the exact code `"en"` counts as English.
    #[must_use]
    pub fn from_code(code: &str) -> Language {
        match code {
            "en" => Language::English,
            _ => Language::Other,
        }
    }

    /// Whether the full extraction + scoring pipeline supports this language.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Language::English)
    }
}

/// Validate a language code, failing fast on anything but `"en"`.
pub fn ensure_supported(code: &str) -> Result<Language> {
    let lang = Language::from_code(code);
    if lang.is_supported() {
        Ok(lang)
    } else {
        Err(Error::UnsupportedLanguage(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_en_accepted() {
        assert_eq!(Language::from_code("en"), Language::English);
        assert!(ensure_supported("en").is_ok());
    }

    #[test]
    fn variants_and_other_languages_rejected() {
        for code in ["EN", "eng", "en-US", "en_GB", "de", "zh"] {
            assert_eq!(Language::from_code(code), Language::Other, "{code}");
            assert!(ensure_supported(code).is_err(), "{code}");
        }
        let err = ensure_supported("cs").unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "cs"));
    }
}
