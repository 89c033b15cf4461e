//! Evaluation driver: QA-pair generation and scoring over a parallel corpus.
//!
//! For every reference line, QA pairs are generated (from extracted answer
//! spans, or in baseline mode from model-proposed spans), deduplicated, and
//! re-answered against the paired hypothesis line; predicted and reference
//! answers are scored with the lexical metrics and averaged per line and over
//! the corpus. Per-line generation failures degrade to an empty pair list and
//! never abort the run; mismatched corpora and unsupported languages fail
//! before any model call.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::annotate::Annotator;
use crate::extract::extract_answers;
use crate::metrics::{compare_answers, AnswerScores};
use crate::pipeline::{dedup_pairs, QaPair, QaQgPipeline};
use crate::{Error, Result};

/// Driver options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreConfig {
    /// Skip span extraction and let the QG model propose its own answers.
    pub baseline_qe: bool,
    /// Also generate questions from the hypothesis and answer them against
    /// the paired reference (two-directional scoring).
    pub gen_from_out: bool,
}

/// Outcome of QA-pair generation for one corpus line.
///
/// Failures are first-class values rather than swallowed exceptions, so the
/// caller can log them while still producing an entry for every line.
#[derive(Debug, Clone)]
pub enum QaGeneration {
    /// Deduplicated QA pairs for the line.
    Generated(Vec<QaPair>),
    /// Generation failed; the line contributes an empty pair list.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl QaGeneration {
    /// The line's QA pairs; empty for failures.
    #[must_use]
    pub fn pairs(&self) -> &[QaPair] {
        match self {
            QaGeneration::Generated(pairs) => pairs,
            QaGeneration::Failed { .. } => &[],
        }
    }
}

/// Scores for one reference/hypothesis line pair.
#[derive(Debug, Clone, Serialize)]
pub struct LineScore {
    /// Reference segment.
    pub reference: String,
    /// Hypothesis (MT output) segment.
    pub hypothesis: String,
    /// Per-line mean over the line's QA pairs.
    pub scores: AnswerScores,
}

/// Full corpus result.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusScore {
    /// One entry per corpus line, in order.
    pub lines: Vec<LineScore>,
    /// Arithmetic mean of the per-line scores.
    pub aggregate: AnswerScores,
}

/// Read one segment per line, trimming trailing whitespace.
pub fn read_corpus(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(|l| l.trim().to_string()).collect())
}

/// Fail fast when the corpora are not parallel.
pub fn validate_corpus(references: &[String], hypotheses: &[String]) -> Result<()> {
    if references.len() != hypotheses.len() {
        return Err(Error::CorpusMismatch {
            references: references.len(),
            hypotheses: hypotheses.len(),
        });
    }
    Ok(())
}

/// Generate deduplicated QA pairs for one line, converting recoverable
/// failures into [`QaGeneration::Failed`].
fn generate_for_line(
    text: &str,
    pipeline: &QaQgPipeline,
    annotator: &dyn Annotator,
    baseline: bool,
) -> Result<QaGeneration> {
    let generated = if baseline {
        pipeline.generate_baseline(text)
    } else {
        extract_answers(text, annotator)
            .and_then(|answers| pipeline.generate_from_answers(text, &answers))
    };

    match generated {
        Ok(pairs) => Ok(QaGeneration::Generated(dedup_pairs(pairs))),
        Err(err) if err.is_per_line_recoverable() => {
            log::warn!("QA generation failed for segment {text:?}: {err}");
            Ok(QaGeneration::Failed {
                reason: err.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}

/// Re-answer each pair's question against `context` and average the metric
/// records.
///
/// A line with zero pairs scores all zeros with a normalization factor of 1.
fn score_pairs(pairs: &[QaPair], context: &str, pipeline: &QaQgPipeline) -> Result<AnswerScores> {
    if pairs.is_empty() {
        return Ok(AnswerScores::default());
    }
    let mut total = AnswerScores::default();
    for pair in pairs {
        let predicted = pipeline.answer(&pair.question, context)?;
        total.accumulate(&compare_answers(&predicted, &pair.answer));
    }
    Ok(total.scaled(pairs.len() as f64))
}

/// Score a parallel corpus.
///
/// `references` and `hypotheses` must have equal length (checked first). Each
/// line is processed fully before the next; models are shared read-only.
pub fn evaluate_corpus(
    references: &[String],
    hypotheses: &[String],
    pipeline: &QaQgPipeline,
    annotator: &dyn Annotator,
    config: &ScoreConfig,
) -> Result<CorpusScore> {
    validate_corpus(references, hypotheses)?;

    // Generate QA pairs from every reference line.
    log::debug!("generating QA pairs for {} segments", references.len());
    let mut generations = Vec::with_capacity(references.len());
    for reference in references {
        generations.push(generate_for_line(
            reference,
            pipeline,
            annotator,
            config.baseline_qe,
        )?);
    }

    // Re-answer against the hypotheses and score.
    log::debug!("scoring {} segments", references.len());
    let mut lines = Vec::with_capacity(references.len());
    for ((reference, hypothesis), generation) in
        references.iter().zip(hypotheses).zip(&generations)
    {
        let forward = score_pairs(generation.pairs(), hypothesis, pipeline)?;

        let scores = if config.gen_from_out {
            // Reverse pass: questions from the hypothesis, answered against
            // the paired reference line.
            let reverse_gen = generate_for_line(
                hypothesis,
                pipeline,
                annotator,
                config.baseline_qe,
            )?;
            let reverse = score_pairs(reverse_gen.pairs(), reference, pipeline)?;
            let mut combined = forward;
            combined.accumulate(&reverse);
            combined.scaled(2.0)
        } else {
            forward
        };

        lines.push(LineScore {
            reference: reference.clone(),
            hypothesis: hypothesis.clone(),
            scores,
        });
    }

    let aggregate = AnswerScores::mean(&lines.iter().map(|l| l.scores).collect::<Vec<_>>());
    Ok(CorpusScore { lines, aggregate })
}

/// Write the corpus result as tab-separated text.
///
/// Default mode prints the aggregate row; verbose mode prints one row per
/// line with the segments included.
pub fn write_scores<W: Write>(result: &CorpusScore, verbose: bool, out: &mut W) -> Result<()> {
    if verbose {
        writeln!(out, "REF\tOUTPUT\tF1\tEM\tchrf\tbleu")?;
        for line in &result.lines {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                line.reference,
                line.hypothesis,
                line.scores.f1,
                line.scores.exact_match,
                line.scores.chrf,
                line.scores.bleu
            )?;
        }
    } else {
        writeln!(out, "F1\tEM\tchrf\tbleu")?;
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            result.aggregate.f1,
            result.aggregate.exact_match,
            result.aggregate.chrf,
            result.aggregate.bleu
        )?;
    }
    Ok(())
}

/// Write the corpus result as pretty-printed JSON (per-line scores plus the
/// aggregate).
pub fn write_scores_json<W: Write>(result: &CorpusScore, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result).map_err(std::io::Error::other)?;
    writeln!(out)?;
    Ok(())
}
