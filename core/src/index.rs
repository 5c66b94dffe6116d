use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

use crate::config::Bm25Params;
use crate::error::{Error, Result};
use crate::record::Record;

pub type DocId = u32;

/// Id of the first record. Ids follow corpus line numbers, matching the
/// benchmark files.
pub const FIRST_DOC_ID: DocId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub score: f64, // BM25 score, summed across words once merged
}

impl Posting {
    pub fn new(doc_id: DocId, score: f64) -> Self {
        Self { doc_id, score }
    }
}

/// First-pass accumulator: raw term frequencies and document lengths.
#[derive(Default)]
struct RawCounts {
    postings_raw: HashMap<String, Vec<(DocId, u32)>>, // (doc_id, tf), sorted by doc_id
    doc_lengths: Vec<u32>,
}

impl RawCounts {
    fn ingest(&mut self, doc_id: DocId, record: &Record) {
        let mut len = 0u32;
        for word in record.tokens() {
            len += 1;
            let plist = self.postings_raw.entry(word).or_default();
            // Documents arrive in id order, so a repeat can only hit the tail.
            match plist.last_mut() {
                Some((last, tf)) if *last == doc_id => *tf += 1,
                _ => plist.push((doc_id, 1)),
            }
        }
        self.doc_lengths.push(len);
    }
}

/// Immutable BM25 inverted index over a corpus of records.
#[derive(Debug)]
pub struct InvertedIndex {
    lists: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    records: Vec<Record>,
    doc_lengths: Vec<u32>,
    avdl: f64,
    params: Bm25Params,
}

impl InvertedIndex {
    /// Build the index in two passes. The first pass counts term
    /// frequencies and document lengths; the second rewrites every raw
    /// frequency into a BM25 score, which needs the average document length
    /// of the whole corpus.
    pub fn build<I>(records: I, params: Bm25Params) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        params.validate()?;

        let mut raw = RawCounts::default();
        let mut docs: Vec<Record> = Vec::new();
        for record in records {
            let doc_id = FIRST_DOC_ID + docs.len() as DocId;
            raw.ingest(doc_id, &record);
            docs.push(record);
        }
        if docs.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let num_docs = docs.len();
        let total_len: u64 = raw.doc_lengths.iter().map(|&l| u64::from(l)).sum();
        let avdl = total_len as f64 / num_docs as f64;
        let num_words = raw.postings_raw.len();
        tracing::debug!(num_docs, num_words, avdl, "first pass complete");

        let RawCounts { postings_raw, doc_lengths } = raw;
        let mut lists: HashMap<String, Vec<Posting>> = HashMap::with_capacity(num_words);
        for (word, plist) in postings_raw {
            let df = plist.len();
            if df == 0 {
                return Err(Error::CorruptIndex { word });
            }
            let idf = (num_docs as f64 / df as f64).log2();
            let scored = plist
                .into_iter()
                .map(|(doc_id, tf)| {
                    // df == N gives idf == 0; keep the score exactly zero.
                    let score = if df == num_docs {
                        0.0
                    } else {
                        let doc_len = doc_lengths[(doc_id - FIRST_DOC_ID) as usize];
                        params.tf_component(tf, doc_len, avdl) * idf
                    };
                    Posting::new(doc_id, score)
                })
                .collect();
            lists.insert(word, scored);
        }

        tracing::info!(
            num_docs,
            num_words = lists.len(),
            avdl,
            b = params.b,
            k = params.k,
            "index build complete"
        );
        Ok(Self { lists, records: docs, doc_lengths, avdl, params })
    }

    /// Build from a stream of `<title>TAB<description>` lines, one record per line.
    pub fn from_reader<R: BufRead>(reader: R, params: Bm25Params) -> Result<Self> {
        let mut records = Vec::new();
        for line in reader.lines() {
            records.push(Record::parse_line(&line?));
        }
        Self::build(records, params)
    }

    pub fn num_docs(&self) -> usize {
        self.records.len()
    }

    pub fn num_words(&self) -> usize {
        self.lists.len()
    }

    pub fn avdl(&self) -> f64 {
        self.avdl
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn contains_doc(&self, doc_id: DocId) -> bool {
        doc_id >= FIRST_DOC_ID && ((doc_id - FIRST_DOC_ID) as usize) < self.records.len()
    }

    pub fn record(&self, doc_id: DocId) -> Option<&Record> {
        if !self.contains_doc(doc_id) {
            return None;
        }
        self.records.get((doc_id - FIRST_DOC_ID) as usize)
    }

    /// Number of tokens in the title and description of `doc_id`.
    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> {
        if !self.contains_doc(doc_id) {
            return None;
        }
        self.doc_lengths.get((doc_id - FIRST_DOC_ID) as usize).copied()
    }

    /// Postings of an already normalized word.
    pub fn postings(&self, word: &str) -> Option<&[Posting]> {
        self.lists.get(word).map(Vec::as_slice)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn from_lists(lists: HashMap<String, Vec<Posting>>, num_docs: usize) -> Self {
        Self {
            lists,
            records: vec![Record::default(); num_docs],
            doc_lengths: vec![0; num_docs],
            avdl: 0.0,
            params: Bm25Params::default(),
        }
    }
}
