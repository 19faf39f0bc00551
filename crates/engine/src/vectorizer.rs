//! Bag-of-words count vectorizer.
//!
//! Fitting collects the distinct tokens of every soup into a sorted
//! vocabulary; each soup then becomes a count vector over that vocabulary.
//! Vectors are stored sparse (sorted `(column, count)` pairs) since a soup
//! touches a few dozen of the thousands of columns.
//!
//! Tokens are runs of two or more word characters, lowercased. English stop
//! words are dropped unless disabled.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// English stop words dropped during tokenization
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former", "formerly",
    "from", "further", "had", "has", "have", "he", "hence", "her", "here", "hereafter", "hereby",
    "herein", "hers", "herself", "him", "himself", "his", "how", "however", "i", "ie", "if",
    "in", "indeed", "into", "is", "it", "its", "itself", "just", "last", "latter", "least",
    "less", "ltd", "many", "may", "me", "meanwhile", "might", "more", "moreover", "most",
    "mostly", "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless",
    "next", "no", "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of",
    "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
    "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please", "rather",
    "re", "same", "seem", "seemed", "seeming", "seems", "several", "she", "should", "since",
    "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "than", "that", "the", "their", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they",
    "this", "those", "though", "through", "throughout", "thru", "thus", "to", "together",
    "too", "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which",
    "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Sparse token-count vector over a fitted vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountVector {
    dim: usize,
    /// Sorted by column, counts are non-zero
    entries: Vec<(usize, u32)>,
}

impl CountVector {
    /// The all-zero vector of a given dimension
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build from `(column, count)` pairs; zero counts are dropped and
    /// repeated columns are summed.
    pub fn from_entries(dim: usize, entries: impl IntoIterator<Item = (usize, u32)>) -> Self {
        let mut merged: BTreeMap<usize, u32> = BTreeMap::new();
        for (column, count) in entries {
            if count > 0 {
                *merged.entry(column).or_insert(0) += count;
            }
        }
        Self {
            dim,
            entries: merged.into_iter().collect(),
        }
    }

    /// Vocabulary size this vector was built against
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    /// Count at one column
    pub fn get(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, count)| (count as f64) * (count as f64))
            .sum::<f64>()
            .sqrt()
    }

    /// Dot product (merge join over the sorted entries)
    pub fn dot(&self, other: &CountVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, va) = self.entries[i];
            let (cb, vb) = other.entries[j];
            if ca == cb {
                sum += va as f64 * vb as f64;
                i += 1;
                j += 1;
            } else if ca < cb {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }
}

/// Count vectorizer with a vocabulary fixed at fit time
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    stop_words: bool,
    vocabulary: BTreeMap<String, usize>,
    fitted: bool,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CountVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(stop_words: bool) -> Self {
        Self {
            stop_words,
            vocabulary: BTreeMap::new(),
            fitted: false,
        }
    }

    /// Learn the vocabulary of `soups` and vectorize them.
    ///
    /// Replaces any previously fitted vocabulary.
    pub fn fit_transform(&mut self, soups: &[String]) -> Vec<CountVector> {
        let tokenized: Vec<Vec<String>> = soups.par_iter().map(|soup| self.tokenize(soup)).collect();

        // BTreeSet keeps columns in token order, independent of corpus order
        let distinct: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        self.vocabulary = distinct
            .into_iter()
            .enumerate()
            .map(|(column, token)| (token.to_string(), column))
            .collect();
        self.fitted = true;

        debug!(
            "Fitted vocabulary of {} tokens over {} soups",
            self.vocabulary.len(),
            soups.len()
        );

        tokenized.par_iter().map(|tokens| self.count(tokens)).collect()
    }

    /// Vectorize one soup against the fitted vocabulary.
    ///
    /// Tokens unseen at fit time are dropped.
    pub fn transform_one(&self, soup: &str) -> CountVector {
        self.count(&self.tokenize(soup))
    }

    /// Distinct tokens of `soup` missing from the vocabulary, sorted
    pub fn unseen_tokens(&self, soup: &str) -> Vec<String> {
        let unseen: BTreeSet<String> = self
            .tokenize(soup)
            .into_iter()
            .filter(|token| !self.vocabulary.contains_key(token))
            .collect();
        unseen.into_iter().collect()
    }

    /// True when vectorizing `soup` would lose no token
    pub fn covers(&self, soup: &str) -> bool {
        self.tokenize(soup)
            .iter()
            .all(|token| self.vocabulary.contains_key(token))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Column of a token, if it is in the vocabulary
    pub fn column(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }

    /// Split text into vocabulary tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| word.chars().nth(1).is_some())
            .map(str::to_lowercase)
            .filter(|word| !(self.stop_words && STOP_WORDS.contains(&word.as_str())))
            .collect()
    }

    fn count(&self, tokens: &[String]) -> CountVector {
        let dim = self.vocabulary.len();
        CountVector::from_entries(
            dim,
            tokens
                .iter()
                .filter_map(|token| self.vocabulary.get(token).map(|&column| (column, 1))),
        )
    }
}
