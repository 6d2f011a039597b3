use thiserror::Error;

use crate::query::Token;
use crate::DocId;

/// Errors raised while building, writing or loading an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dictionary file at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Term {0:?} is empty or contains whitespace")]
    InvalidTerm(String),

    #[error("Posting list at offset {offset} with {length} ids runs past the end of a {file_len}-byte postings file")]
    PostingsOutOfRange { offset: u64, length: u32, file_len: u64 },

    #[error("Documents must be added in ascending order: got {got} after {previous}")]
    OutOfOrderDocument { previous: DocId, got: DocId },
}

impl IndexError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        IndexError::Format { line, reason: reason.into() }
    }
}

/// Errors in the shape of a boolean query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unbalanced parentheses in query")]
    UnbalancedParentheses,

    #[error("Operator {0} is missing an operand")]
    MissingOperand(Token),
}

/// Anything that can go wrong answering a single query.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl SearchError {
    /// Query errors only affect the query that caused them; index errors are fatal.
    pub fn is_query_error(&self) -> bool {
        matches!(self, SearchError::Query(_))
    }
}

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Index(IndexError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
