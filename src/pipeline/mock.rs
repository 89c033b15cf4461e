//! Mock seq2seq model for tests and dry runs.
//!
//! Tracks how often and how large `generate` is called, so tests can assert
//! the empty-input short-circuit and the batch-size bound without real model
//! weights. The default responses are deterministic functions of the prompt
//! format the pipeline uses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::Seq2SeqModel;
use crate::{Error, Result};

type QaResponder = Box<dyn Fn(&str, &str) -> String + Send + Sync>;

/// In-memory stand-in for a QA/QG seq2seq model.
///
/// Token ids index into an internal string table, so `tokenize`/`decode` are
/// exact inverses and `generate` works on whole prompts.
pub struct MockSeq2Seq {
    table: Mutex<Vec<String>>,
    generate_calls: AtomicUsize,
    max_batch: AtomicUsize,
    extract_response: Option<String>,
    qa_responder: Option<QaResponder>,
    fail_generate: bool,
}

impl MockSeq2Seq {
    /// Create a mock with the default deterministic responses.
    #[must_use]
    pub fn new() -> MockSeq2Seq {
        MockSeq2Seq {
            table: Mutex::new(Vec::new()),
            generate_calls: AtomicUsize::new(0),
            max_batch: AtomicUsize::new(0),
            extract_response: None,
            qa_responder: None,
            fail_generate: false,
        }
    }

    /// Fix the decoded output of `extract answers:` prompts.
    #[must_use]
    pub fn with_extract_response(mut self, response: impl Into<String>) -> MockSeq2Seq {
        self.extract_response = Some(response.into());
        self
    }

    /// Answer `question: .. context: ..` prompts with a custom function of
    /// (question, context). The default echoes the context.
    #[must_use]
    pub fn with_qa_responder(
        mut self,
        responder: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> MockSeq2Seq {
        self.qa_responder = Some(Box::new(responder));
        self
    }

    /// Make every `generate` call fail with an inference error.
    #[must_use]
    pub fn with_generate_failure(mut self) -> MockSeq2Seq {
        self.fail_generate = true;
        self
    }

    /// Number of `generate` calls made so far.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Largest batch passed to a single `generate` call.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch.load(Ordering::SeqCst)
    }

    fn intern(&self, text: String) -> u32 {
        let mut table = self.table.lock().expect("mock table lock");
        table.push(text);
        (table.len() - 1) as u32
    }

    fn lookup(&self, id: u32) -> Option<String> {
        self.table
            .lock()
            .expect("mock table lock")
            .get(id as usize)
            .cloned()
    }

    fn respond(&self, prompt: &str) -> String {
        if let Some(rest) = prompt.strip_prefix("extract answers: ") {
            if let Some(fixed) = &self.extract_response {
                return fixed.clone();
            }
            // First word of the highlighted sentence.
            let inner = rest.trim_start_matches("<hl>").trim();
            return inner.split_whitespace().next().unwrap_or("").to_string();
        }
        if let Some(rest) = prompt.strip_prefix("generate question: ") {
            let span = rest
                .split("<hl>")
                .nth(1)
                .map(str::trim)
                .unwrap_or("it");
            return format!("What is {span}?");
        }
        if let Some(rest) = prompt.strip_prefix("answer: ") {
            if let Some((answer, _context)) = rest.split_once("  context: ") {
                return format!("What is {}?", answer.trim());
            }
        }
        if let Some(rest) = prompt.strip_prefix("question: ") {
            if let Some((question, context)) = rest.split_once("  context: ") {
                return match &self.qa_responder {
                    Some(responder) => responder(question.trim(), context.trim()),
                    None => context.trim().to_string(),
                };
            }
        }
        prompt.to_string()
    }
}

impl Default for MockSeq2Seq {
    fn default() -> Self {
        MockSeq2Seq::new()
    }
}

impl Seq2SeqModel for MockSeq2Seq {
    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        Ok(vec![self.intern(text.to_string())])
    }

    fn generate(&self, inputs: &[Vec<u32>], _max_new_tokens: usize) -> Result<Vec<Vec<u32>>> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.max_batch.fetch_max(inputs.len(), Ordering::SeqCst);
        if self.fail_generate {
            return Err(Error::inference("mock generate failure"));
        }

        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let prompt = input
                .first()
                .and_then(|&id| self.lookup(id))
                .ok_or_else(|| Error::inference("mock: unknown input id"))?;
            let response = self.respond(&prompt);
            outputs.push(vec![self.intern(response)]);
        }
        Ok(outputs)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let id = ids
            .first()
            .ok_or_else(|| Error::tokenizer("mock: empty output"))?;
        self.lookup(*id)
            .ok_or_else(|| Error::tokenizer("mock: unknown output id"))
    }

    fn name(&self) -> &'static str {
        "mock-seq2seq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_table() {
        let mock = MockSeq2Seq::new();
        let ids = mock.tokenize("hello world").unwrap();
        assert_eq!(mock.decode(&ids).unwrap(), "hello world");
    }

    #[test]
    fn default_responses_are_deterministic() {
        let mock = MockSeq2Seq::new();
        assert_eq!(
            mock.respond("generate question: The cat sat on <hl> the red mat <hl> ."),
            "What is the red mat?"
        );
        assert_eq!(
            mock.respond("question: What sat?  context: A cat sat."),
            "A cat sat."
        );
        assert_eq!(
            mock.respond("extract answers: <hl> The cat sat. <hl>"),
            "The"
        );
    }

    #[test]
    fn call_accounting() {
        let mock = MockSeq2Seq::new();
        let a = mock.tokenize("question: q  context: c").unwrap();
        let b = mock.tokenize("question: q2  context: c2").unwrap();
        mock.generate(&[a, b], 16).unwrap();
        assert_eq!(mock.generate_calls(), 1);
        assert_eq!(mock.max_batch_size(), 2);
    }

    #[test]
    fn failure_mode_surfaces_error() {
        let mock = MockSeq2Seq::new().with_generate_failure();
        let ids = mock.tokenize("anything").unwrap();
        let err = mock.generate(&[ids], 16).unwrap_err();
        assert!(err.is_per_line_recoverable());
    }
}
