use crate::error::{QueryError, SearchError};
use crate::persist::PostingsSource;
use crate::query::{self, Token};
use crate::tokenizer::Normalizer;
use crate::{merge, Dictionary, DocId};

/// Evaluates postfix boolean queries against a loaded dictionary.
///
/// Holds only shared, read-only state; the postings source is passed per call so each caller
/// can bring its own file handle.
pub struct Evaluator<'a> {
    dictionary: &'a Dictionary,
    normalizer: &'a Normalizer,
}

impl<'a> Evaluator<'a> {
    pub fn new(dictionary: &'a Dictionary, normalizer: &'a Normalizer) -> Self {
        Self { dictionary, normalizer }
    }

    /// Parse and evaluate a raw query string.
    pub fn search<S: PostingsSource>(&self, query: &str, source: &mut S) -> Result<Vec<DocId>, SearchError> {
        let postfix = query::parse(query)?;
        tracing::debug!(query, postfix = %query::postfix_string(&postfix), "parsed query");
        self.evaluate(&postfix, source)
    }

    pub fn evaluate<S: PostingsSource>(&self, postfix: &[Token], source: &mut S) -> Result<Vec<DocId>, SearchError> {
        let mut stack: Vec<Vec<DocId>> = Vec::new();
        for token in postfix {
            let result = match token {
                Token::Operand(word) => self.postings(word, source)?,
                Token::And | Token::Or => {
                    let right = stack.pop().ok_or_else(|| QueryError::MissingOperand(token.clone()))?;
                    let left = stack.pop().ok_or_else(|| QueryError::MissingOperand(token.clone()))?;
                    if *token == Token::And {
                        merge::and(&left, &right)
                    } else {
                        merge::or(&left, &right)
                    }
                }
                Token::Not => {
                    let operand = stack.pop().ok_or_else(|| QueryError::MissingOperand(Token::Not))?;
                    merge::not(&operand, self.dictionary.universe())
                }
            };
            stack.push(result);
        }

        if stack.len() > 1 {
            tracing::warn!(
                items = stack.len(),
                postfix = %query::postfix_string(postfix),
                "query left extra operands on the stack; returning the top item"
            );
        }
        Ok(stack.pop().unwrap_or_default())
    }

    /// Posting list for one query word, empty if the word normalizes away or is not indexed.
    fn postings<S: PostingsSource>(&self, word: &str, source: &mut S) -> Result<Vec<DocId>, SearchError> {
        let Some(term) = self.normalizer.normalize(word) else {
            return Ok(Vec::new());
        };
        match self.dictionary.get(&term) {
            Some(entry) => Ok(source.load(entry.offset, entry.doc_freq)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::DictEntry;
    use std::collections::HashMap;

    /// In-memory postings keyed by offset.
    struct MemPostings(HashMap<u64, Vec<DocId>>);

    impl PostingsSource for MemPostings {
        fn load(&mut self, offset: u64, length: u32) -> Result<Vec<DocId>> {
            let list = self.0.get(&offset).cloned().unwrap_or_default();
            assert_eq!(list.len(), length as usize);
            Ok(list)
        }
    }

    fn fixture() -> (Dictionary, MemPostings) {
        let mut dict = Dictionary::new(vec![1, 2, 3, 4, 5]);
        let mut mem = HashMap::new();
        let mut offset = 0u64;
        for (term, list) in [("cat", vec![1, 3, 5]), ("dog", vec![2, 3]), ("bird", vec![4])] {
            dict.insert(term.into(), DictEntry { doc_freq: list.len() as u32, offset });
            offset += list.len() as u64 * crate::ID_WIDTH;
            mem.insert(dict.get(term).unwrap().offset, list);
        }
        (dict, MemPostings(mem))
    }

    #[test]
    fn evaluates_nested_queries() {
        let (dict, mut mem) = fixture();
        let normalizer = Normalizer::default();
        let eval = Evaluator::new(&dict, &normalizer);
        assert_eq!(eval.search("cat AND dog", &mut mem).unwrap(), vec![3]);
        assert_eq!(eval.search("cats OR bird", &mut mem).unwrap(), vec![1, 3, 4, 5]);
        assert_eq!(eval.search("NOT cat", &mut mem).unwrap(), vec![2, 4]);
        assert_eq!(eval.search("NOT (cat OR dog)", &mut mem).unwrap(), vec![4]);
        assert_eq!(eval.search("NOT cat AND NOT dog", &mut mem).unwrap(), vec![4]);
    }

    #[test]
    fn unknown_and_dropped_terms_are_empty() {
        let (dict, mut mem) = fixture();
        let normalizer = Normalizer::default();
        let eval = Evaluator::new(&dict, &normalizer);
        assert!(eval.search("unicorn", &mut mem).unwrap().is_empty());
        assert!(eval.search("the", &mut mem).unwrap().is_empty());
        assert_eq!(eval.search("cat OR unicorn", &mut mem).unwrap(), vec![1, 3, 5]);
        assert_eq!(eval.search("NOT unicorn", &mut mem).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn missing_operand_is_reported() {
        let (dict, mut mem) = fixture();
        let normalizer = Normalizer::default();
        let eval = Evaluator::new(&dict, &normalizer);
        let err = eval.search("cat AND", &mut mem).unwrap_err();
        assert!(matches!(err, SearchError::Query(QueryError::MissingOperand(Token::And))));
        let err = eval.search("NOT", &mut mem).unwrap_err();
        assert!(matches!(err, SearchError::Query(QueryError::MissingOperand(Token::Not))));
    }

    #[test]
    fn extra_operands_return_top_of_stack() {
        let (dict, mut mem) = fixture();
        let normalizer = Normalizer::default();
        let eval = Evaluator::new(&dict, &normalizer);
        assert_eq!(eval.search("cat dog", &mut mem).unwrap(), vec![2, 3]);
        assert!(eval.search("", &mut mem).unwrap().is_empty());
    }
}
