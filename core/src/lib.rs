pub mod builder;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod index;
pub mod merge;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use index::{is_valid_term, DictEntry, Dictionary, DocId, ID_WIDTH};
