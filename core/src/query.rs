use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::index::{DocId, InvertedIndex, Posting};
use crate::merge::{intersect, merge};
use crate::tokenizer::tokenize;

/// How the postings lists of the query words are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Union with summed scores: a document matches if it has any query word.
    #[default]
    Any,
    /// Boolean AND: a document matches only if it has every query word.
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub mode: QueryMode,
    /// Rank documents matching more distinct query words first, then by score.
    #[serde(default)]
    pub use_refinements: bool,
}

impl InvertedIndex {
    /// Rank documents for a keyword query, best first.
    ///
    /// Every keyword goes through the same tokenizer as the corpus. Words
    /// missing from the index add nothing; they do not empty the result. An
    /// empty query, or one without any word characters, yields an empty list.
    pub fn process_query<S: AsRef<str>>(
        &self,
        keywords: &[S],
        use_refinements: bool,
    ) -> Vec<Posting> {
        let opts = QueryOptions { mode: QueryMode::Any, use_refinements };
        self.process_query_with(keywords, &opts)
    }

    pub fn process_query_with<S: AsRef<str>>(
        &self,
        keywords: &[S],
        opts: &QueryOptions,
    ) -> Vec<Posting> {
        let words: Vec<String> = keywords.iter().flat_map(|k| tokenize(k.as_ref())).collect();
        self.rank_words(&words, opts)
    }

    /// Same as [`InvertedIndex::process_query_with`] for a raw query string.
    pub fn search(&self, query: &str, opts: &QueryOptions) -> Vec<Posting> {
        let words: Vec<String> = tokenize(query).collect();
        self.rank_words(&words, opts)
    }

    fn rank_words(&self, words: &[String], opts: &QueryOptions) -> Vec<Posting> {
        if words.is_empty() {
            return Vec::new();
        }
        let lists: Vec<Option<&[Posting]>> = words.iter().map(|w| self.postings(w)).collect();

        let mut ranked = match opts.mode {
            QueryMode::Any => {
                lists.iter().flatten().fold(Vec::new(), |acc, plist| merge(&acc, plist))
            }
            QueryMode::All => {
                if lists.iter().any(Option::is_none) {
                    Vec::new()
                } else {
                    let mut present: Vec<&[Posting]> = lists.iter().flatten().copied().collect();
                    present.sort_by_key(|plist| plist.len());
                    match present.split_first() {
                        Some((first, rest)) => {
                            rest.iter().fold(first.to_vec(), |acc, plist| intersect(&acc, plist))
                        }
                        None => Vec::new(),
                    }
                }
            }
        };

        if opts.use_refinements {
            let matched = matched_word_counts(words, |w| self.postings(w));
            ranked.sort_by(|a, b| {
                let count = |p: &Posting| matched.get(&p.doc_id).copied().unwrap_or(0);
                count(b).cmp(&count(a)).then_with(|| by_score(a, b))
            });
        } else {
            ranked.sort_by(by_score);
        }
        tracing::debug!(
            ?words,
            mode = ?opts.mode,
            refinements = opts.use_refinements,
            hits = ranked.len(),
            "processed query"
        );
        ranked
    }
}

fn by_score(a: &Posting, b: &Posting) -> std::cmp::Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

/// Number of distinct query words each document contains.
fn matched_word_counts<'a, F>(words: &[String], postings: F) -> HashMap<DocId, u32>
where
    F: Fn(&str) -> Option<&'a [Posting]>,
{
    let distinct: HashSet<&str> = words.iter().map(String::as_str).collect();
    let mut counts: HashMap<DocId, u32> = HashMap::new();
    for plist in distinct.into_iter().filter_map(postings) {
        for p in plist {
            *counts.entry(p.doc_id).or_insert(0) += 1;
        }
    }
    counts
}

/// The first `k` entries of a ranked list.
pub fn top_k(ranked: &[Posting], k: usize) -> &[Posting] {
    &ranked[..k.min(ranked.len())]
}
