//! Error types for mteqa.

use thiserror::Error;

/// Result type for mteqa operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mteqa operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Reference language is not supported.
    #[error("Language \"{0}\" is not supported (only \"en\")")]
    UnsupportedLanguage(String),

    /// Reference and hypothesis corpora have different lengths.
    #[error("Reference and MT output files have different number of lines ({references} vs {hypotheses})")]
    CorpusMismatch {
        /// Number of reference lines.
        references: usize,
        /// Number of hypothesis lines.
        hypotheses: usize,
    },

    /// Model initialization failed.
    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    /// Model inference failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Tokenization or decoding failed.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Answer-span extraction failed.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model file retrieval error (local path or HuggingFace cache).
    #[error("Retrieval error: {0}")]
    Retrieval(String),
}

impl Error {
    /// Create a model initialization error.
    pub fn model_init(msg: impl Into<String>) -> Self {
        Error::ModelInit(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Error::Inference(msg.into())
    }

    /// Create a tokenizer error.
    pub fn tokenizer(msg: impl Into<String>) -> Self {
        Error::Tokenizer(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Error::Extraction(msg.into())
    }

    /// Create a retrieval error.
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Error::Retrieval(msg.into())
    }

    /// True for errors that are recoverable per corpus line.
    ///
    /// Extraction and inference failures on a single segment downgrade to an
    /// empty QA-pair list; everything else aborts the run.
    #[must_use]
    pub fn is_per_line_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Extraction(_)
                | Error::Inference(_)
                | Error::Tokenizer(_)
                | Error::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::CorpusMismatch {
            references: 5,
            hypotheses: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn recoverability_split() {
        assert!(Error::inference("t5 failed").is_per_line_recoverable());
        assert!(Error::extraction("no tags").is_per_line_recoverable());
        assert!(!Error::UnsupportedLanguage("de".into()).is_per_line_recoverable());
        assert!(!Error::CorpusMismatch {
            references: 1,
            hypotheses: 2
        }
        .is_per_line_recoverable());
    }
}
