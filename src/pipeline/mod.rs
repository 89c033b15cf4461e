//! Question-generation / question-answering pipeline.
//!
//! A single seq2seq model (multi-task QA+QG, t5-style) is driven in three
//! ways: generate a question for a supplied answer span, propose its own
//! answer spans (baseline mode), or answer a question against a context
//! passage. The model is consumed strictly through the [`Seq2SeqModel`]
//! capability set {tokenize, generate, decode}, so any implementation with
//! those three operations is substitutable.

pub mod mock;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use mock::MockSeq2Seq;
#[cfg(feature = "onnx")]
pub use onnx::{OrtSeq2Seq, OrtSeq2SeqConfig};

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{collapse_whitespace, segment_sentences};
use crate::{Error, Result};

/// Question-generation requests per model batch.
///
/// Inputs are chunked to this size before hitting the model so a sentence
/// with many spans cannot produce an unbounded batch.
pub const QG_BATCH_SIZE: usize = 4;

/// Generation cap for questions.
pub const QG_MAX_NEW_TOKENS: usize = 32;

/// Generation cap for answers; keeps predictions span-like instead of free
/// text.
pub const QA_MAX_NEW_TOKENS: usize = 16;

/// Highlight marker token understood by the QG model.
const HL_TOKEN: &str = "<hl>";
/// Separator token between model-proposed answers.
const SEP_TOKEN: &str = "<sep>";

/// Text-to-text model capability set.
///
/// Implementations must be shareable across the whole run; the pipeline never
/// mutates model state.
pub trait Seq2SeqModel: Send + Sync {
    /// Encode text into model token ids.
    fn tokenize(&self, text: &str) -> Result<Vec<u32>>;

    /// Generate output ids for a batch of tokenized inputs, in input order.
    fn generate(&self, inputs: &[Vec<u32>], max_new_tokens: usize) -> Result<Vec<Vec<u32>>>;

    /// Decode generated ids to text with control tokens stripped.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Model name, for logging.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// One generated question with the answer it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QaPair {
    /// The answer span the question was generated for.
    pub answer: String,
    /// The generated question.
    pub question: String,
}

impl QaPair {
    /// Create a pair.
    pub fn new(answer: impl Into<String>, question: impl Into<String>) -> QaPair {
        QaPair {
            answer: answer.into(),
            question: question.into(),
        }
    }
}

/// Deduplicate pairs by (answer, question) value, keeping first-seen order.
#[must_use]
pub fn dedup_pairs(pairs: Vec<QaPair>) -> Vec<QaPair> {
    let mut seen = HashSet::new();
    pairs.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// How an answer span is marked in the question-generation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QgFormat {
    /// Wrap the span in `<hl>` markers inside its sentence.
    #[default]
    Highlight,
    /// Prepend `answer: ... context: ...` before the full text.
    Prepend,
}

/// QA/QG pipeline over one shared seq2seq model.
pub struct QaQgPipeline {
    model: Arc<dyn Seq2SeqModel>,
    format: QgFormat,
}

impl QaQgPipeline {
    /// Create a pipeline with the default highlight format.
    pub fn new(model: Arc<dyn Seq2SeqModel>) -> QaQgPipeline {
        QaQgPipeline {
            model,
            format: QgFormat::default(),
        }
    }

    /// Select the answer-marking format.
    #[must_use]
    pub fn with_format(mut self, format: QgFormat) -> QaQgPipeline {
        self.format = format;
        self
    }

    /// Tokenize, generate, decode for a batch of prompts, preserving order.
    fn generate_text(&self, prompts: &[String], max_new_tokens: usize) -> Result<Vec<String>> {
        let inputs: Vec<Vec<u32>> = prompts
            .iter()
            .map(|p| self.model.tokenize(p))
            .collect::<Result<_>>()?;
        let outputs = self.model.generate(&inputs, max_new_tokens)?;
        if outputs.len() != inputs.len() {
            return Err(Error::inference(format!(
                "model returned {} outputs for {} inputs",
                outputs.len(),
                inputs.len()
            )));
        }
        outputs
            .iter()
            .map(|ids| self.model.decode(ids))
            .collect()
    }

    /// Chunked generation: fixed-size batches, results concatenated in input
    /// order.
    fn generate_chunked(&self, prompts: &[String], max_new_tokens: usize) -> Result<Vec<String>> {
        let mut results = Vec::with_capacity(prompts.len());
        for chunk in prompts.chunks(QG_BATCH_SIZE) {
            results.extend(self.generate_text(chunk, max_new_tokens)?);
        }
        Ok(results)
    }

    /// Generate one question per supplied answer span.
    ///
    /// `answer_sets` is aligned with the sub-sentences of `text` (one set per
    /// sentence, as produced by [`crate::extract::extract_answers`]). An
    /// empty span collection returns immediately without any model call.
    pub fn generate_from_answers(
        &self,
        text: &str,
        answer_sets: &[Vec<String>],
    ) -> Result<Vec<QaPair>> {
        if answer_sets.iter().all(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let text = collapse_whitespace(text);
        let sentences = segment_sentences(&text);

        let mut answers = Vec::new();
        let mut prompts = Vec::new();
        match self.format {
            QgFormat::Highlight => {
                for (sentence, set) in sentences.iter().zip(answer_sets) {
                    for answer in set {
                        match highlight_span(sentence, answer) {
                            Some(marked) => {
                                prompts.push(format!("generate question: {marked}"));
                                answers.push(answer.clone());
                            }
                            None => {
                                log::debug!(
                                    "answer {answer:?} not found in sentence, skipping span"
                                );
                            }
                        }
                    }
                }
            }
            QgFormat::Prepend => {
                for set in answer_sets {
                    for answer in set {
                        prompts.push(format!("answer: {answer}  context: {text}"));
                        answers.push(answer.clone());
                    }
                }
            }
        }

        if prompts.is_empty() {
            return Ok(Vec::new());
        }

        let questions = self.generate_chunked(&prompts, QG_MAX_NEW_TOKENS)?;
        Ok(answers
            .into_iter()
            .zip(questions)
            .map(|(answer, question)| QaPair::new(answer, question))
            .collect())
    }

    /// Baseline QA-pair generation: the model proposes its own answer spans.
    ///
    /// Each sentence is highlighted whole and sent through an
    /// `extract answers:` prompt; the decoded `<sep>`-separated spans are then
    /// fed back through [`Self::generate_from_answers`].
    pub fn generate_baseline(&self, text: &str) -> Result<Vec<QaPair>> {
        let text = collapse_whitespace(text);
        let sentences = segment_sentences(&text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let prompts: Vec<String> = sentences
            .iter()
            .map(|s| format!("extract answers: {HL_TOKEN} {s} {HL_TOKEN}"))
            .collect();
        let decoded = self.generate_chunked(&prompts, QG_MAX_NEW_TOKENS)?;

        let answer_sets: Vec<Vec<String>> = decoded
            .iter()
            .map(|out| {
                out.split(SEP_TOKEN)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        self.generate_from_answers(&text, &answer_sets)
    }

    /// Answer `question` from `context`; one model call, 16-token cap.
    pub fn answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = format!("question: {question}  context: {context}");
        let outputs = self.generate_text(&[prompt], QA_MAX_NEW_TOKENS)?;
        Ok(outputs.into_iter().next().unwrap_or_default().trim().to_string())
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }
}

/// Wrap the first occurrence of `answer` in `sentence` with highlight
/// markers. Returns `None` when the span text does not occur.
///
/// Extracted phrases are space-joined tokens, so punctuation carries spaces
/// the raw sentence does not have ("1 , 000" for "1,000"); when the literal
/// text is not found, the tokens are rematched with flexible inter-token
/// spacing.
fn highlight_span(sentence: &str, answer: &str) -> Option<String> {
    let (start, end) = match sentence.find(answer) {
        Some(idx) => (idx, idx + answer.len()),
        None => {
            let pattern = answer
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s*");
            let found = Regex::new(&pattern).ok()?.find(sentence)?;
            (found.start(), found.end())
        }
    };
    let before = &sentence[..start];
    let span = &sentence[start..end];
    let after = &sentence[end..];
    Some(collapse_whitespace(&format!(
        "{before} {HL_TOKEN} {span} {HL_TOKEN} {after}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_marks_span_in_place() {
        let marked = highlight_span("The cat sat on the red mat.", "the red mat").unwrap();
        assert_eq!(marked, "The cat sat on <hl> the red mat <hl> .");
        assert!(highlight_span("no overlap here", "missing").is_none());
    }

    #[test]
    fn highlight_rematches_tokenized_punctuation() {
        // Extracted phrases space out punctuation; the raw sentence does not.
        let marked = highlight_span("It costs 1,000 dollars.", "1 , 000").unwrap();
        assert_eq!(marked, "It costs <hl> 1,000 <hl> dollars.");
        let marked = highlight_span("He toured the capital, Paris.", "the capital , Paris").unwrap();
        assert!(marked.contains("<hl> the capital, Paris <hl>"), "{marked}");
    }

    #[test]
    fn numeric_spans_survive_highlight_format() {
        let mock = Arc::new(MockSeq2Seq::new());
        let pipeline = QaQgPipeline::new(mock.clone());
        let pairs = pipeline
            .generate_from_answers("It costs 1,000 dollars.", &[vec!["1 , 000".to_string()]])
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "1 , 000");
        assert_eq!(pairs[0].question, "What is 1,000?");
        assert_eq!(mock.generate_calls(), 1);
    }

    #[test]
    fn dedup_pairs_is_value_based() {
        let pairs = vec![
            QaPair::new("cat", "What sat?"),
            QaPair::new("cat", "What sat?"),
            QaPair::new("cat", "Who sat?"),
            QaPair::new("mat", "What sat?"),
        ];
        let unique = dedup_pairs(pairs);
        assert_eq!(unique.len(), 3);
        let mut seen = std::collections::HashSet::new();
        assert!(unique.iter().all(|p| seen.insert((p.answer.clone(), p.question.clone()))));
    }

    #[test]
    fn empty_answer_sets_short_circuit() {
        let mock = Arc::new(MockSeq2Seq::new());
        let pipeline = QaQgPipeline::new(mock.clone());
        let pairs = pipeline.generate_from_answers("Some text.", &[]).unwrap();
        assert!(pairs.is_empty());
        let pairs = pipeline
            .generate_from_answers("Some text.", &[Vec::new(), Vec::new()])
            .unwrap();
        assert!(pairs.is_empty());
        assert_eq!(mock.generate_calls(), 0);
    }

    #[test]
    fn batching_preserves_order_and_count() {
        let mock = Arc::new(MockSeq2Seq::new());
        let pipeline = QaQgPipeline::new(mock.clone()).with_format(QgFormat::Prepend);

        let answers: Vec<String> = (0..10).map(|i| format!("answer{i}")).collect();
        let pairs = pipeline
            .generate_from_answers("context sentence", &[answers.clone()])
            .unwrap();

        // 10 spans, chunk size 4: same 10 questions, input order, max batch 4.
        assert_eq!(pairs.len(), 10);
        for (pair, answer) in pairs.iter().zip(&answers) {
            assert_eq!(&pair.answer, answer);
            assert_eq!(pair.question, format!("What is {answer}?"));
        }
        assert_eq!(mock.generate_calls(), 3);
        assert!(mock.max_batch_size() <= QG_BATCH_SIZE);
    }

    #[test]
    fn prepend_format_spans_need_no_substring_match() {
        let mock = Arc::new(MockSeq2Seq::new());
        let pipeline = QaQgPipeline::new(mock).with_format(QgFormat::Prepend);
        let pairs = pipeline
            .generate_from_answers("The cat sat.", &[vec!["paraphrased span".to_string()]])
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "paraphrased span");
    }

    #[test]
    fn answer_formats_single_prompt() {
        let mock = Arc::new(MockSeq2Seq::new());
        let pipeline = QaQgPipeline::new(mock.clone());
        let answer = pipeline.answer("What sat?", "A cat sat there.").unwrap();
        assert_eq!(answer, "A cat sat there.");
        assert_eq!(mock.generate_calls(), 1);
    }

    #[test]
    fn baseline_mode_uses_model_proposed_spans() {
        let mock = Arc::new(
            MockSeq2Seq::new().with_extract_response("cat <sep> the red mat <sep>"),
        );
        let pipeline = QaQgPipeline::new(mock);
        let pairs = pipeline
            .generate_baseline("The cat sat on the red mat.")
            .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].answer, "cat");
        assert_eq!(pairs[1].answer, "the red mat");
    }
}
