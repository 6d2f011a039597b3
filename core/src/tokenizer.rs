use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

use crate::is_valid_term;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+(?:[.,]\p{N}+)*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn is_number(token: &str, strip_commas: bool) -> bool {
    if strip_commas {
        token.replace(',', "").parse::<f64>().is_ok()
    } else {
        token.parse::<f64>().is_ok()
    }
}

/// Split raw text into raw tokens: words (letters first, inner apostrophes allowed) and numbers.
pub fn tokenize(text: &str) -> Vec<&str> {
    RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Toggles for each normalization step. Build and query must use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub casefold: bool,
    pub ignore_stopwords: bool,
    pub ignore_numbers: bool,
    /// Remove thousands separators before the numeric check.
    pub strip_number_commas: bool,
    pub stem: bool,
    pub ignore_singles: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            casefold: true,
            ignore_stopwords: true,
            ignore_numbers: true,
            strip_number_commas: true,
            stem: true,
            ignore_singles: true,
        }
    }
}

/// Raw token in, canonical term out (or `None` to drop it).
///
/// Stateless apart from its config, so one value can be shared by the index builder and any
/// number of query evaluators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cfg = &self.config;
        let mut term = if cfg.casefold {
            raw.nfkc().collect::<String>().to_lowercase()
        } else {
            raw.to_string()
        };
        if term.is_empty() { return None; }
        if cfg.ignore_stopwords && is_stopword(&term) { return None; }
        if cfg.ignore_numbers && is_number(&term, cfg.strip_number_commas) { return None; }
        if cfg.stem {
            term = STEMMER.stem(&term).into_owned();
        }
        // possessives can leave a dangling apostrophe behind
        if term.ends_with('\'') {
            term.pop();
        }
        // compatibility decompositions can expand one letter into several words
        if !is_valid_term(&term) { return None; }
        if cfg.ignore_singles && term.chars().count() == 1 { return None; }
        Some(term)
    }

    /// Tokenize and normalize a whole document, in document order.
    ///
    /// NFKC runs over the whole text before splitting so expanded characters split into words.
    pub fn terms(&self, text: &str) -> Vec<String> {
        if self.config.casefold {
            let normalized = text.nfkc().collect::<String>();
            tokenize(&normalized).into_iter().filter_map(|t| self.normalize(t)).collect()
        } else {
            tokenize(text).into_iter().filter_map(|t| self.normalize(t)).collect()
        }
    }
}
