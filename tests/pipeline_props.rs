//! Properties of the extraction and question-generation pipeline.

use std::sync::Arc;

use mteqa::annotate::{Annotator, HeuristicAnnotator};
use mteqa::extract::{extract_answers, match_patterns, retain_maximal_spans};
use mteqa::pipeline::{dedup_pairs, MockSeq2Seq, QaPair, QaQgPipeline, QgFormat, QG_BATCH_SIZE};

const SENTENCES: &[&str] = &[
    "The cat sat on the red mat.",
    "Marie Curie won the Nobel Prize in 1903.",
    "A small dog chased three birds across the old bridge.",
    "It rained for seven days.",
];

#[test]
fn no_retained_span_is_subsumed() {
    let annotator = HeuristicAnnotator::new();
    for sentence in SENTENCES {
        let tokens = annotator.pos_tags(sentence).unwrap();
        let tags: Vec<_> = tokens.iter().map(|t| t.tag).collect();
        let spans = retain_maximal_spans(match_patterns(&tags));
        for f in &spans {
            for g in &spans {
                assert!(
                    !f.is_strict_subset_of(g),
                    "{sentence}: {f:?} subsumed by {g:?}"
                );
            }
        }
    }
}

#[test]
fn extracted_phrase_sets_have_no_token_subset_pairs() {
    let annotator = HeuristicAnnotator::new();
    for sentence in SENTENCES {
        for phrases in extract_answers(sentence, &annotator).unwrap() {
            let sets: Vec<std::collections::HashSet<&str>> = phrases
                .iter()
                .map(|p| p.split_whitespace().collect())
                .collect();
            for (i, f) in sets.iter().enumerate() {
                for (j, g) in sets.iter().enumerate() {
                    if i != j {
                        assert!(
                            !(f.len() < g.len() && f.is_subset(g)),
                            "{sentence}: {:?} subsumed by {:?}",
                            phrases[i],
                            phrases[j]
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn qa_pairs_are_value_unique_after_dedup() {
    let pairs = vec![
        QaPair::new("a", "q1"),
        QaPair::new("a", "q1"),
        QaPair::new("a", "q2"),
        QaPair::new("b", "q1"),
        QaPair::new("b", "q1"),
    ];
    let unique = dedup_pairs(pairs);
    let mut seen = std::collections::HashSet::new();
    for pair in &unique {
        assert!(seen.insert((pair.answer.clone(), pair.question.clone())));
    }
    assert_eq!(unique.len(), 3);
}

#[test]
fn empty_span_collection_never_reaches_the_model() {
    let mock = Arc::new(MockSeq2Seq::new());
    let pipeline = QaQgPipeline::new(mock.clone());
    let pairs = pipeline
        .generate_from_answers("Anything at all.", &[vec![], vec![]])
        .unwrap();
    assert!(pairs.is_empty());
    assert_eq!(mock.generate_calls(), 0);
}

#[test]
fn chunked_generation_matches_unchunked_output() {
    // The chunked pipeline must return the same questions, in the same
    // order, as one idealized unchunked pass over the same inputs.
    let answers: Vec<String> = (0..10).map(|i| format!("span{i}")).collect();

    let chunked_mock = Arc::new(MockSeq2Seq::new());
    let chunked = QaQgPipeline::new(chunked_mock.clone())
        .with_format(QgFormat::Prepend)
        .generate_from_answers("some context", &[answers.clone()])
        .unwrap();

    assert_eq!(chunked.len(), answers.len());
    for (pair, answer) in chunked.iter().zip(&answers) {
        assert_eq!(&pair.answer, answer);
        // The mock's question is a pure function of the input, so equality
        // with the per-input expectation proves chunking changed nothing.
        assert_eq!(pair.question, format!("What is {answer}?"));
    }
    assert!(chunked_mock.max_batch_size() <= QG_BATCH_SIZE);
    assert_eq!(
        chunked_mock.generate_calls(),
        answers.len().div_ceil(QG_BATCH_SIZE)
    );
}

#[test]
fn answer_generation_is_length_capped_single_call() {
    let mock = Arc::new(MockSeq2Seq::new());
    let pipeline = QaQgPipeline::new(mock.clone());
    let answer = pipeline
        .answer("Who sat on the mat?", "The big cat sat on the mat.")
        .unwrap();
    assert_eq!(answer, "The big cat sat on the mat.");
    assert_eq!(mock.generate_calls(), 1);
    assert_eq!(mock.max_batch_size(), 1);
}
