use std::collections::HashMap;

pub type DocId = u32;

/// Width in bytes of one encoded document ID in the postings file.
pub const ID_WIDTH: u64 = 4;

/// Dictionary keys are space-delimited on disk, so a term must be non-empty and free of whitespace.
pub fn is_valid_term(term: &str) -> bool {
    !term.is_empty() && !term.chars().any(char::is_whitespace)
}

/// Where a term's posting list lives in the postings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry {
    pub doc_freq: u32,
    /// Byte offset of the term's first document ID.
    pub offset: u64,
}

impl DictEntry {
    /// Length in bytes of the posting list this entry points at.
    pub fn byte_len(&self) -> u64 {
        self.doc_freq as u64 * ID_WIDTH
    }
}

/// In-memory dictionary: term -> (df, offset), plus the sorted universe of indexed document IDs.
///
/// The whole dictionary is held in memory for the lifetime of a search process; only postings are
/// read from disk.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    entries: HashMap<String, DictEntry>,
    order: Vec<String>,
    universe: Vec<DocId>,
}

impl Dictionary {
    pub fn new(universe: Vec<DocId>) -> Self {
        Self { entries: HashMap::new(), order: Vec::new(), universe }
    }

    /// Insert an entry, keeping file order. Returns false if the term was already present.
    pub fn insert(&mut self, term: String, entry: DictEntry) -> bool {
        if self.entries.contains_key(&term) {
            return false;
        }
        self.order.push(term.clone());
        self.entries.insert(term, entry);
        true
    }

    pub fn get(&self, term: &str) -> Option<DictEntry> {
        self.entries.get(term).copied()
    }

    pub fn universe(&self) -> &[DocId] {
        &self.universe
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in the order they appear in the dictionary file.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DictEntry)> + '_ {
        self.order.iter().map(move |t| (t.as_str(), self.entries[t]))
    }
}
