use thiserror::Error;

/// Errors raised while building, querying or evaluating an index.
#[derive(Debug, Error)]
pub enum Error {
    /// The corpus contained no records, so the average document length is undefined.
    #[error("empty corpus: at least one record is required to build an index")]
    EmptyCorpus,
    #[error("invalid BM25 parameters: {0}")]
    InvalidParams(String),
    /// An indexed word ended up with no postings. Cannot happen for an
    /// index built by `InvertedIndex::build`.
    #[error("corrupt index: word {word:?} has document frequency 0")]
    CorruptIndex { word: String },
    #[error("malformed benchmark line {line}: {reason}")]
    MalformedBenchmark { line: usize, reason: String },
    #[error("empty benchmark: nothing to evaluate")]
    EmptyBenchmark,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
