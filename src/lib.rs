//! # mteqa
//!
//! Question-answering based machine translation evaluation.
//!
//! The score of a hypothesis translation is how well questions generated
//! from the reference can be answered from the hypothesis:
//!
//! ```text
//! reference ──► answer-span extraction ──► question generation
//!                                               │
//!                                               ▼
//! hypothesis ──────────────────────────► question answering
//!                                               │
//!                                               ▼
//!                              F1 / EM / chrF / BLEU vs. reference answers
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use mteqa::annotate::HeuristicAnnotator;
//! use mteqa::pipeline::{MockSeq2Seq, QaQgPipeline};
//! use mteqa::score::{evaluate_corpus, ScoreConfig};
//!
//! let pipeline = QaQgPipeline::new(Arc::new(MockSeq2Seq::new()));
//! let annotator = HeuristicAnnotator::new();
//! let refs = vec!["The cat sat on the red mat.".to_string()];
//! let hyps = vec!["A cat was sitting on a red mat.".to_string()];
//! let result =
//!     evaluate_corpus(&refs, &hyps, &pipeline, &annotator, &ScoreConfig::default()).unwrap();
//! assert_eq!(result.lines.len(), 1);
//! ```
//!
//! With the `onnx` feature (default), [`pipeline::OrtSeq2Seq`] runs a real
//! optimum-exported QA/QG model; the mock exists so the orchestration logic is
//! testable without weights.
//!
//! ## Design
//!
//! - The seq2seq model is consumed only through the
//!   [`Seq2SeqModel`](pipeline::Seq2SeqModel) capability set
//!   {tokenize, generate, decode}; any implementation is substitutable.
//! - Taggers are consumed through the [`Annotator`](annotate::Annotator)
//!   trait; both are loaded once and shared read-only for a whole run.
//! - Per-line generation failures are explicit
//!   [`QaGeneration::Failed`](score::QaGeneration) values, never swallowed
//!   exceptions; the corpus aggregate is always computable.

#![warn(missing_docs)]

pub mod annotate;
mod error;
pub mod extract;
pub mod lang;
pub mod metrics;
pub mod pipeline;
pub mod score;
pub mod text;

pub use error::{Error, Result};
pub use lang::{ensure_supported, Language};
pub use metrics::{compare_answers, AnswerScores};
pub use pipeline::{QaPair, QaQgPipeline, QgFormat, Seq2SeqModel};
pub use score::{evaluate_corpus, CorpusScore, ScoreConfig};
