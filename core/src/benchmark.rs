use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::index::DocId;

/// Queries mapped to the ids of their relevant documents (1-based line
/// numbers in the corpus).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Benchmark {
    queries: BTreeMap<String, BTreeSet<DocId>>,
}

impl Benchmark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<query>TAB<id> <id> ...` lines. Blank lines are skipped and a
    /// query listed twice keeps the union of its ids.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut benchmark = Self::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let lineno = n + 1;
            let (query, ids) = line.split_once('\t').ok_or_else(|| Error::MalformedBenchmark {
                line: lineno,
                reason: "missing TAB between query and document ids".into(),
            })?;
            let relevant = benchmark.queries.entry(query.to_string()).or_default();
            for token in ids.split_whitespace() {
                if !is_integer(token) {
                    return Err(Error::MalformedBenchmark {
                        line: lineno,
                        reason: format!("invalid document id {token:?}"),
                    });
                }
                // Integers no document can have (negative, too large) are
                // dropped here; evaluation drops ids past the corpus end.
                match token.parse::<DocId>() {
                    Ok(id) => {
                        relevant.insert(id);
                    }
                    Err(_) => {
                        tracing::warn!(line = lineno, id = token, "ignoring out-of-range id")
                    }
                }
            }
        }
        tracing::debug!(queries = benchmark.len(), "benchmark loaded");
        Ok(benchmark)
    }

    pub fn insert<I>(&mut self, query: impl Into<String>, relevant: I)
    where
        I: IntoIterator<Item = DocId>,
    {
        self.queries.entry(query.into()).or_default().extend(relevant);
    }

    pub fn relevant(&self, query: &str) -> Option<&BTreeSet<DocId>> {
        self.queries.get(query)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<DocId>)> {
        self.queries.iter().map(|(q, ids)| (q.as_str(), ids))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// An optionally signed run of ASCII digits.
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|c| c.is_ascii_digit())
}
