//! Syntactic annotation: part-of-speech tagging and named-entity mentions.
//!
//! The extraction pipeline consumes annotators as black boxes behind the
//! [`Annotator`] trait, so a statistical tagging pipeline can be swapped in
//! without touching the span extractor. The built-in implementation is the
//! heuristic tagger in [`heuristic`].

pub mod heuristic;

pub use heuristic::HeuristicAnnotator;

use crate::Result;

/// Universal part-of-speech tags used by the answer patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Verb,
    Other,
}

/// A word or punctuation token with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text.
    pub text: String,
    /// Universal POS tag.
    pub tag: PosTag,
}

impl Token {
    /// Create a token.
    pub fn new(text: impl Into<String>, tag: PosTag) -> Token {
        Token {
            text: text.into(),
            tag,
        }
    }
}

/// Black-box syntactic annotator: POS tags and entity mentions for one
/// sentence.
///
/// Implementations are expected to be loaded once and shared read-only for a
/// whole run.
pub trait Annotator: Send + Sync {
    /// Tag every token of `sentence` with a part-of-speech tag.
    fn pos_tags(&self, sentence: &str) -> Result<Vec<Token>>;

    /// Named-entity mention surface strings found in `sentence`.
    fn entity_mentions(&self, sentence: &str) -> Result<Vec<String>>;

    /// Annotator name, for logging.
    fn name(&self) -> &'static str {
        "unknown"
    }
}
