//! Plain-text helpers: sentence segmentation, word tokenization, whitespace
//! normalization.
//!
//! Segmentation is rule-based. It only needs to be good enough to feed the
//! answer-span extractor one clause-sized unit at a time; MT segments are
//! usually a single sentence already.

/// Abbreviations that do not end a sentence despite a trailing period.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd", "corp", "co",
    "gov", "gen", "col", "sgt", "capt", "lt", "e.g", "i.e", "u.s", "u.k", "no", "fig", "al",
];

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus any trailing closing quotes or
/// brackets) when followed by whitespace and an uppercase letter or digit.
/// Trailing periods of known abbreviations and single-letter initials are not
/// sentence ends.
#[must_use]
pub fn segment_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '.' || c == '!' || c == '?' {
            // Absorb closing quotes/brackets after the terminator.
            let mut end = i + 1;
            while end < chars.len() && matches!(chars[end], '"' | '\'' | ')' | ']' | '\u{201d}') {
                end += 1;
            }

            let followed_by_break = match chars[end..].iter().find(|ch| !ch.is_whitespace()) {
                Some(next) => {
                    chars[end..].iter().next().is_some_and(|ch| ch.is_whitespace())
                        && (next.is_uppercase() || next.is_ascii_digit())
                }
                // Terminator at end of input always closes the sentence.
                None => true,
            };

            if followed_by_break && !(c == '.' && is_abbreviation_end(&chars, i)) {
                let sentence: String = chars[start..end].iter().collect();
                let sentence = sentence.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
            i = end;
        } else {
            i += 1;
        }
    }

    let tail: String = chars[start..].iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Whether the period at `idx` terminates an abbreviation or initial.
fn is_abbreviation_end(chars: &[char], idx: usize) -> bool {
    let mut start = idx;
    while start > 0 && (chars[start - 1].is_alphanumeric() || chars[start - 1] == '.') {
        start -= 1;
    }
    let word: String = chars[start..idx].iter().collect::<String>().to_lowercase();
    if word.is_empty() {
        return false;
    }
    // Single-letter initials like "J." in "J. Smith".
    if word.chars().count() == 1 && word.chars().all(|c| c.is_alphabetic()) {
        return true;
    }
    ABBREVIATIONS.contains(&word.as_str())
}

/// Split a sentence into word and punctuation tokens.
///
/// Alphanumeric runs (with internal apostrophes, as in "don't") are single
/// tokens; every other non-whitespace character is its own token. "1,000"
/// becomes `["1", ",", "000"]`, which is what the `[NUM, PUNCT, NUM]` answer
/// pattern expects.
#[must_use]
pub fn tokenize_words(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = sentence.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
        } else if c == '\'' || c == '\u{2019}' {
            // Keep apostrophes inside a word, split leading/trailing ones.
            let interior = !current.is_empty()
                && chars.get(i + 1).is_some_and(|next| next.is_alphanumeric());
            if interior {
                current.push(c);
            } else {
                flush(&mut tokens, &mut current);
                tokens.push(c.to_string());
            }
        } else if c.is_whitespace() {
            flush(&mut tokens, &mut current);
        } else {
            flush(&mut tokens, &mut current);
            tokens.push(c.to_string());
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_flattens_runs() {
        assert_eq!(collapse_whitespace("  a\t b\n\nc "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn single_sentence_untouched() {
        let sents = segment_sentences("The cat sat on the red mat.");
        assert_eq!(sents, vec!["The cat sat on the red mat."]);
    }

    #[test]
    fn splits_on_terminator_before_uppercase() {
        let sents = segment_sentences("It rained. The match was cancelled! Why?");
        assert_eq!(
            sents,
            vec!["It rained.", "The match was cancelled!", "Why?"]
        );
    }

    #[test]
    fn abbreviations_do_not_split() {
        let sents = segment_sentences("Dr. Smith arrived at 5 p.m. and left.");
        assert_eq!(sents.len(), 1);
        let sents = segment_sentences("Mr. J. Doe met Mrs. Roe. They talked.");
        assert_eq!(sents.len(), 2);
    }

    #[test]
    fn no_terminator_is_one_sentence() {
        let sents = segment_sentences("a fragment without punctuation");
        assert_eq!(sents, vec!["a fragment without punctuation"]);
    }

    #[test]
    fn tokenize_splits_punctuation() {
        assert_eq!(
            tokenize_words("The cat sat on the red mat."),
            vec!["The", "cat", "sat", "on", "the", "red", "mat", "."]
        );
        assert_eq!(tokenize_words("1,000"), vec!["1", ",", "000"]);
        assert_eq!(tokenize_words("3.5"), vec!["3", ".", "5"]);
    }

    #[test]
    fn tokenize_keeps_contractions() {
        assert_eq!(tokenize_words("don't stop"), vec!["don't", "stop"]);
        assert_eq!(tokenize_words("'quoted'"), vec!["'", "quoted", "'"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize_words("").is_empty());
        assert!(tokenize_words("   ").is_empty());
    }
}
