//! In-memory BM25 keyword search over `<title>TAB<description>` records,
//! plus ranking evaluation against a labeled benchmark.

pub mod benchmark;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod index;
pub mod merge;
pub mod query;
pub mod record;
pub mod tokenizer;

pub use benchmark::Benchmark;
pub use config::Bm25Params;
pub use error::{Error, Result};
pub use evaluate::{average_precision, evaluate, precision_at_k, Metrics};
pub use index::{DocId, InvertedIndex, Posting};
pub use merge::{intersect, merge};
pub use query::{top_k, QueryMode, QueryOptions};
pub use record::Record;
