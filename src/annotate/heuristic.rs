//! Heuristic English annotator: lexicon and suffix based POS tagging plus
//! capitalization-based named-entity mentions.
//!
//! This stands in for a statistical tagging pipeline behind the
//! [`Annotator`](super::Annotator) trait. Closed-class words are tagged by
//! lookup, open-class words by suffix rules, and everything left over is a
//! noun, which is the class the answer patterns care about most. Accuracy is
//! well below a trained tagger, but it needs no model files and keeps the
//! extraction pipeline runnable everywhere.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{Annotator, PosTag, Token};
use crate::text::tokenize_words;
use crate::Result;

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "another", "both", "all", "either", "neither", "such",
];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "over", "under",
    "of", "off", "near", "across", "behind", "beyond", "within", "without", "along", "around",
    "upon", "despite", "toward", "towards", "per", "until", "via",
];

const COORDINATORS: &[&str] = &["and", "or", "but", "nor", "plus"];

const SUBORDINATORS: &[&str] = &[
    "because", "if", "while", "although", "though", "since", "unless", "whereas", "whether",
    "when", "where", "as",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "who", "whom",
    "whose", "which", "what", "myself", "yourself", "himself", "herself", "itself", "ourselves",
    "themselves", "my", "your", "his", "its", "our", "their", "mine", "yours", "hers", "theirs",
    "someone", "anyone", "everyone", "nothing", "something", "anything", "everything",
];

const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "shall", "should", "may", "might", "must", "can", "could",
];

const PARTICLES: &[&str] = &["not", "n't"];

const ADVERBS: &[&str] = &[
    "very", "never", "also", "now", "here", "there", "well", "often", "still", "just", "then",
    "too", "again", "once", "always", "usually", "really", "quite", "rather", "almost",
    "already", "soon", "perhaps", "maybe", "however", "instead", "together", "away", "back",
    "even", "only", "yet", "so",
];

/// Words ending in "-ly" that are not adverbs.
const LY_EXCEPTIONS: &[&str] = &[
    "family", "supply", "reply", "italy", "july", "assembly", "belly", "jelly", "ally", "bully",
    "fly", "apply", "rally", "monopoly", "anomaly", "butterfly", "early",
];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "big", "small", "large", "little", "old", "young", "new", "long", "short",
    "high", "low", "red", "blue", "green", "yellow", "black", "white", "brown", "orange",
    "purple", "pink", "gray", "grey", "hot", "cold", "warm", "cool", "fast", "slow", "hard",
    "soft", "easy", "difficult", "early", "late", "important", "great", "nice", "beautiful",
    "happy", "sad", "rich", "poor", "strong", "weak", "full", "empty", "open", "right", "wrong",
    "main", "major", "minor", "free", "whole", "same", "different", "next", "last", "few",
    "several", "many", "much", "own", "other", "first", "second", "third", "best", "worst",
    "better", "worse", "public", "local", "national", "general", "final", "recent", "able",
];

const ADJ_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ish"];

const VERBS: &[&str] = &[
    "sat", "ran", "went", "said", "says", "saw", "came", "knew", "thought", "found", "gave",
    "told", "became", "left", "put", "brought", "began", "kept", "held", "wrote", "stood",
    "heard", "meant", "met", "paid", "sent", "built", "won", "sold", "got", "took", "made",
    "spoke", "drove", "ate", "fell", "felt", "flew", "grew", "lost", "rose", "spent", "taught",
    "threw", "wore", "chose", "broke", "bought", "caught", "led", "sang", "go", "come", "make",
    "take", "get", "see", "know", "think", "say", "tell", "give", "find", "use", "work", "call",
    "try", "ask", "need", "feel", "become", "leave", "mean", "keep", "let", "begin", "seem",
    "help", "talk", "turn", "start", "show", "hear", "play", "run", "move", "like", "live",
    "believe", "hold", "bring", "happen", "write", "provide", "sit", "stand", "lose", "pay",
    "meet", "include", "continue", "set", "learn", "change", "lead", "watch", "follow", "stop",
    "create", "speak", "spend", "grow", "walk", "win", "offer", "remember", "love", "consider",
    "appear", "buy", "wait", "serve", "die", "send", "expect", "build", "stay", "fall", "cut",
    "reach", "remain", "eat", "want",
];

/// Words ending in "-ing" that are not verb forms.
const ING_EXCEPTIONS: &[&str] = &[
    "thing", "king", "ring", "spring", "string", "wing", "morning", "evening", "nothing",
    "something", "anything", "everything", "building", "meeting", "beginning",
];

/// Words ending in "-ed" that are not verb forms.
const ED_EXCEPTIONS: &[&str] = &["red", "bed", "hundred", "naked", "wicked", "sacred", "hatred"];

/// Lowercase connectors allowed inside a multi-word entity mention.
const ENTITY_CONNECTORS: &[&str] = &["of", "the", "and", "de", "da", "van", "von", "del"];

static CLOSED_CLASS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    DETERMINERS
        .iter()
        .chain(ADPOSITIONS)
        .chain(COORDINATORS)
        .chain(SUBORDINATORS)
        .chain(PRONOUNS)
        .chain(AUXILIARIES)
        .chain(PARTICLES)
        .chain(ADVERBS)
        .copied()
        .collect()
});

/// Lexicon and suffix based annotator for English.
#[derive(Debug, Default)]
pub struct HeuristicAnnotator;

impl HeuristicAnnotator {
    /// Create a new heuristic annotator.
    #[must_use]
    pub fn new() -> Self {
        HeuristicAnnotator
    }

    fn tag_token(&self, token: &str, sentence_initial: bool) -> PosTag {
        let lower = token.to_lowercase();

        if !token.chars().any(char::is_alphanumeric) {
            return PosTag::Punct;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            return PosTag::Num;
        }
        if NUMBER_WORDS.contains(&lower.as_str()) {
            return PosTag::Num;
        }
        if DETERMINERS.contains(&lower.as_str()) {
            return PosTag::Det;
        }
        if ADPOSITIONS.contains(&lower.as_str()) {
            return PosTag::Adp;
        }
        if COORDINATORS.contains(&lower.as_str()) {
            return PosTag::Cconj;
        }
        if SUBORDINATORS.contains(&lower.as_str()) {
            return PosTag::Sconj;
        }
        if PRONOUNS.contains(&lower.as_str()) {
            return PosTag::Pron;
        }
        if AUXILIARIES.contains(&lower.as_str()) {
            return PosTag::Aux;
        }
        if PARTICLES.contains(&lower.as_str()) {
            return PosTag::Part;
        }
        if ADVERBS.contains(&lower.as_str())
            || (lower.ends_with("ly")
                && lower.chars().count() > 4
                && !LY_EXCEPTIONS.contains(&lower.as_str()))
        {
            return PosTag::Adv;
        }
        if ADJECTIVES.contains(&lower.as_str())
            || ADJ_SUFFIXES.iter().any(|suf| lower.ends_with(suf))
        {
            return PosTag::Adj;
        }
        if VERBS.contains(&lower.as_str())
            || (lower.ends_with("ing")
                && lower.chars().count() > 4
                && !ING_EXCEPTIONS.contains(&lower.as_str()))
            || (lower.ends_with("ed")
                && lower.chars().count() > 3
                && !ED_EXCEPTIONS.contains(&lower.as_str()))
        {
            return PosTag::Verb;
        }
        if !sentence_initial && token.chars().next().is_some_and(char::is_uppercase) {
            return PosTag::Propn;
        }
        PosTag::Noun
    }

    fn is_mention_word(token: &str) -> bool {
        token.chars().next().is_some_and(char::is_uppercase)
            && token.chars().any(char::is_alphabetic)
            && !CLOSED_CLASS.contains(token.to_lowercase().as_str())
    }
}

impl Annotator for HeuristicAnnotator {
    fn pos_tags(&self, sentence: &str) -> Result<Vec<Token>> {
        let words = tokenize_words(sentence);
        Ok(words
            .iter()
            .enumerate()
            .map(|(i, word)| Token::new(word.clone(), self.tag_token(word, i == 0)))
            .collect())
    }

    /// Capitalized runs are entity candidates, with single lowercase
    /// connectors ("Bank of America") allowed inside a run. A sentence-initial
    /// word only starts a mention if it is not a common/closed-class word.
    fn entity_mentions(&self, sentence: &str) -> Result<Vec<String>> {
        let words = tokenize_words(sentence);
        let mut mentions = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        let mut flush = |run: &mut Vec<&str>| {
            if !run.is_empty() {
                mentions.push(run.join(" "));
                run.clear();
            }
        };

        let mut i = 0;
        while i < words.len() {
            let word = &words[i];
            let capitalized = Self::is_mention_word(word);

            if capitalized && (i != 0 || !CLOSED_CLASS.contains(word.to_lowercase().as_str())) {
                // Sentence-initial capitals are ambiguous; only count clearly
                // name-like ones (part of a longer run, or tagged Propn-like
                // elsewhere). A lone initial common noun is dropped below.
                if i == 0 {
                    let continues = words
                        .get(1)
                        .is_some_and(|next| Self::is_mention_word(next));
                    if !continues {
                        i += 1;
                        continue;
                    }
                }
                run.push(word);
            } else if !run.is_empty()
                && ENTITY_CONNECTORS.contains(&word.to_lowercase().as_str())
                && words.get(i + 1).is_some_and(|next| Self::is_mention_word(next))
            {
                run.push(word);
            } else {
                flush(&mut run);
            }
            i += 1;
        }
        flush(&mut run);
        Ok(mentions)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
