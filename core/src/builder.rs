use crate::error::{IndexError, Result};
use crate::persist::{write_dictionary, write_posting_list};
use crate::tokenizer::Normalizer;
use crate::{is_valid_term, DictEntry, Dictionary, DocId, ID_WIDTH};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Counts reported once an index has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub documents: usize,
    pub terms: usize,
    pub postings: u64,
}

/// Accumulates posting lists in memory and writes the dictionary and postings files.
///
/// Documents must arrive in ascending ID order, so a term's list only ever needs its last element
/// checked to stay free of duplicates.
pub struct IndexBuilder {
    normalizer: Normalizer,
    limit: Option<usize>,
    terms: Vec<(String, Vec<DocId>)>,
    term_slots: HashMap<String, usize>,
    indexed: Vec<DocId>,
}

impl IndexBuilder {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer, limit: None, terms: Vec::new(), term_slots: HashMap::new(), indexed: Vec::new() }
    }

    /// Stop accepting documents once `limit` have been indexed.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.indexed.len() >= limit)
    }

    pub fn documents(&self) -> usize {
        self.indexed.len()
    }

    /// Tokenize, normalize and index one document. Returns false if the limit was already reached.
    pub fn add_document(&mut self, doc_id: DocId, text: &str) -> Result<bool> {
        let terms = self.normalizer.terms(text);
        self.add_terms(doc_id, terms)
    }

    /// Index already-normalized terms for one document.
    ///
    /// Terms that are empty or contain whitespace are rejected before anything is recorded.
    pub fn add_terms<I>(&mut self, doc_id: DocId, terms: I) -> Result<bool>
    where
        I: IntoIterator<Item = String>,
    {
        if self.is_full() {
            return Ok(false);
        }
        if let Some(&previous) = self.indexed.last() {
            if doc_id <= previous {
                return Err(IndexError::OutOfOrderDocument { previous, got: doc_id });
            }
        }
        let terms: Vec<String> = terms.into_iter().collect();
        if let Some(bad) = terms.iter().find(|t| !is_valid_term(t)) {
            return Err(IndexError::InvalidTerm(bad.clone()));
        }
        for term in terms {
            match self.term_slots.get(&term) {
                Some(&slot) => {
                    let postings = &mut self.terms[slot].1;
                    if postings.last() != Some(&doc_id) {
                        postings.push(doc_id);
                    }
                }
                None => {
                    self.term_slots.insert(term.clone(), self.terms.len());
                    self.terms.push((term, vec![doc_id]));
                }
            }
        }
        self.indexed.push(doc_id);
        Ok(true)
    }

    /// Write both files, terms in first-seen order.
    ///
    /// Each file is written to a temporary sibling and renamed into place; the postings file is
    /// renamed before the dictionary that points into it.
    pub fn write<P: AsRef<Path>, Q: AsRef<Path>>(self, dictionary_path: P, postings_path: Q) -> Result<BuildSummary> {
        let dictionary_path = dictionary_path.as_ref();
        let postings_path = postings_path.as_ref();
        let documents = self.indexed.len();
        let terms = self.terms.len();

        let mut dictionary = Dictionary::new(self.indexed);
        let mut postings_tmp = BufWriter::new(temp_sibling(postings_path)?);
        let mut offset = 0u64;
        for (term, postings) in self.terms {
            write_posting_list(&mut postings_tmp, &postings)?;
            let doc_freq = postings.len() as u32;
            dictionary.insert(term, DictEntry { doc_freq, offset });
            offset += doc_freq as u64 * ID_WIDTH;
        }
        let postings_tmp = postings_tmp.into_inner().map_err(|e| e.into_error())?;

        let mut dictionary_tmp = BufWriter::new(temp_sibling(dictionary_path)?);
        write_dictionary(&mut dictionary_tmp, &dictionary)?;
        dictionary_tmp.flush()?;
        let dictionary_tmp = dictionary_tmp.into_inner().map_err(|e| e.into_error())?;

        postings_tmp.persist(postings_path).map_err(|e| e.error)?;
        dictionary_tmp.persist(dictionary_path).map_err(|e| e.error)?;

        let summary = BuildSummary { documents, terms, postings: offset / ID_WIDTH };
        tracing::info!(
            documents = summary.documents,
            terms = summary.terms,
            postings = summary.postings,
            dictionary = %dictionary_path.display(),
            "index written"
        );
        Ok(summary)
    }
}

fn temp_sibling(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}
