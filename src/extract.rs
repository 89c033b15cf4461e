//! Answer-span extraction.
//!
//! Candidate answer phrases for a sentence come from two sources: named
//! entity mentions and a fixed library of part-of-speech patterns slid over
//! the tagged token sequence. Overlapping candidates are reduced to maximal
//! spans (subsumption filtering), once over POS index spans and once more over
//! the merged phrase set.

use std::collections::HashSet;

use crate::annotate::{Annotator, PosTag};
use crate::text::segment_sentences;
use crate::Result;

use PosTag::{Adj, Adp, Adv, Cconj, Det, Noun, Num, Punct, Verb};

/// POS tag sequences that mark an answer-worthy phrase.
///
/// Matched exactly and contiguously; longer patterns subsume shorter ones at
/// the same position via the maximal-span filter.
pub const PATTERNS: &[&[PosTag]] = &[
    &[Noun],
    &[Num],
    &[Det, Noun],
    &[Num, Noun],
    &[Num, Noun, Noun],
    &[Noun, Noun],
    &[Det, Noun, Noun],
    &[Adj, Noun],
    &[Det, Adj, Noun],
    &[Det, Adj, Adj, Noun],
    &[Det, Noun, Punct, Noun],
    &[Det, Verb, Noun],
    &[Num, Punct, Num],
    &[Det, Adj, Noun, Noun],
    &[Det, Adv, Verb, Noun],
    &[Det, Adv, Verb, Adj, Noun],
    &[Det, Adv, Adj, Noun],
    &[Det, Noun, Adp, Noun],
    &[Det, Adj, Cconj, Adj, Noun],
];

/// Half-open token index span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
}

impl Span {
    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the span covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `self`'s index set is a strict subset of `other`'s.
    ///
    /// Spans are contiguous, so strict subset is containment with smaller
    /// cardinality.
    #[must_use]
    pub fn is_strict_subset_of(&self, other: &Span) -> bool {
        other.start <= self.start && self.end <= other.end && self.len() < other.len()
    }
}

/// All index spans where any pattern matches the tag sequence exactly.
///
/// A pattern may match zero or many times; an empty tag sequence yields no
/// candidates.
#[must_use]
pub fn match_patterns(tags: &[PosTag]) -> Vec<Span> {
    let mut spans = Vec::new();
    for pattern in PATTERNS {
        if pattern.len() > tags.len() {
            continue;
        }
        for start in 0..=tags.len() - pattern.len() {
            if tags[start..start + pattern.len()] == **pattern {
                spans.push(Span {
                    start,
                    end: start + pattern.len(),
                });
            }
        }
    }
    spans
}

/// Keep only maximal spans: drop any span whose index set is a strict subset
/// of another candidate's.
///
/// Equal spans survive (a span is not a strict subset of itself or of an
/// equal span); duplicates are collapsed afterwards by the caller's value
/// dedup.
#[must_use]
pub fn retain_maximal_spans(spans: Vec<Span>) -> Vec<Span> {
    spans
        .iter()
        .filter(|f| !spans.iter().any(|g| f.is_strict_subset_of(g)))
        .copied()
        .collect()
}

/// Second-stage filter over phrase strings: drop any phrase whose
/// whitespace-token set is a strict subset of another retained phrase's.
#[must_use]
pub fn retain_maximal_phrases(phrases: Vec<String>) -> Vec<String> {
    let token_sets: Vec<HashSet<&str>> = phrases
        .iter()
        .map(|p| p.split_whitespace().collect())
        .collect();

    phrases
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let f = &token_sets[*i];
            !token_sets
                .iter()
                .any(|g| f.len() < g.len() && f.is_subset(g))
        })
        .map(|(_, p)| p.clone())
        .collect()
}

/// Deduplicate by value, keeping first occurrence order.
fn dedup_values(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Extract candidate answer phrases from `text`, one filtered set per
/// sub-sentence.
///
/// Combines named-entity mentions with POS-pattern phrases, then reduces the
/// union to maximal, value-unique phrases.
pub fn extract_answers(text: &str, annotator: &dyn Annotator) -> Result<Vec<Vec<String>>> {
    let mut per_sentence = Vec::new();

    for sentence in segment_sentences(text) {
        let entities = annotator.entity_mentions(&sentence)?;

        let tokens = annotator.pos_tags(&sentence)?;
        let tags: Vec<PosTag> = tokens.iter().map(|t| t.tag).collect();
        let spans = retain_maximal_spans(match_patterns(&tags));
        let phrases: Vec<String> = spans
            .iter()
            .map(|span| {
                tokens[span.start..span.end]
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let merged = dedup_values(entities.into_iter().chain(phrases).collect());
        per_sentence.push(retain_maximal_phrases(merged));
    }

    Ok(per_sentence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::HeuristicAnnotator;

    fn span(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    #[test]
    fn pattern_matching_finds_all_positions() {
        // NOUN NOUN NOUN: [Noun] matches 3x, [Noun, Noun] matches 2x.
        let tags = vec![Noun, Noun, Noun];
        let spans = match_patterns(&tags);
        assert!(spans.contains(&span(0, 1)));
        assert!(spans.contains(&span(1, 2)));
        assert!(spans.contains(&span(2, 3)));
        assert!(spans.contains(&span(0, 2)));
        assert!(spans.contains(&span(1, 3)));
    }

    #[test]
    fn empty_tags_yield_no_candidates() {
        assert!(match_patterns(&[]).is_empty());
        assert!(match_patterns(&[Punct]).is_empty());
    }

    #[test]
    fn maximal_span_filter_drops_strict_subsets() {
        let spans = retain_maximal_spans(vec![span(0, 1), span(0, 3), span(1, 3), span(4, 5)]);
        assert_eq!(spans, vec![span(0, 3), span(4, 5)]);
    }

    #[test]
    fn equal_cardinality_ties_all_retained() {
        // Overlapping but neither contains the other.
        let spans = retain_maximal_spans(vec![span(0, 2), span(1, 3)]);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn subsumption_invariant_holds() {
        let tags = vec![Det, Adj, Noun, Adp, Det, Noun, Noun];
        let spans = retain_maximal_spans(match_patterns(&tags));
        for f in &spans {
            for g in &spans {
                assert!(!f.is_strict_subset_of(g), "{f:?} subset of {g:?}");
            }
        }
    }

    #[test]
    fn phrase_filter_uses_token_sets() {
        let phrases = retain_maximal_phrases(vec![
            "cat".to_string(),
            "the red mat".to_string(),
            "red mat".to_string(),
        ]);
        assert_eq!(phrases, vec!["cat", "the red mat"]);
    }

    #[test]
    fn phrase_filter_keeps_equal_sets() {
        let phrases =
            retain_maximal_phrases(vec!["red mat".to_string(), "mat red".to_string()]);
        assert_eq!(phrases.len(), 2);
    }

    #[test]
    fn extracts_expected_phrases() {
        let annotator = HeuristicAnnotator::new();
        let answers = extract_answers("The cat sat on the red mat.", &annotator).unwrap();
        assert_eq!(answers.len(), 1);
        let first = &answers[0];
        assert!(first.contains(&"the red mat".to_string()), "{first:?}");
        // "cat" survives as part of the maximal "The cat" span.
        assert!(
            first.iter().any(|p| p.split_whitespace().any(|w| w == "cat")),
            "{first:?}"
        );
        // "mat" alone is subsumed by "the red mat".
        assert!(!first.contains(&"mat".to_string()), "{first:?}");
    }

    #[test]
    fn one_answer_set_per_sub_sentence() {
        let annotator = HeuristicAnnotator::new();
        let answers =
            extract_answers("The cat sat. The dog barked.", &annotator).unwrap();
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn no_candidates_for_empty_input() {
        let annotator = HeuristicAnnotator::new();
        assert!(extract_answers("", &annotator).unwrap().is_empty());
    }
}
