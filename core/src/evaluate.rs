//! Ranking quality against a benchmark: P@k, AP and their means.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::benchmark::Benchmark;
use crate::error::{Error, Result};
use crate::index::{DocId, InvertedIndex};

/// Mean metrics over all benchmark queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mp_at_3: f64,
    pub mp_at_r: f64,
    pub map: f64,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MP@3 = {:.3}, MP@R = {:.3}, MAP = {:.3}", self.mp_at_3, self.mp_at_r, self.map)
    }
}

/// Fraction of the first `k` results that are relevant. The denominator is
/// always `k`, so a result list shorter than `k` is penalized. `k == 0`
/// gives 0.
pub fn precision_at_k(result_ids: &[DocId], relevant: &BTreeSet<DocId>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = result_ids.iter().take(k).filter(|&&id| relevant.contains(&id)).count();
    hits as f64 / k as f64
}

/// Sum of P@i over every rank i holding a relevant document, divided by the
/// number of relevant documents. An empty relevant set gives 0.
pub fn average_precision(result_ids: &[DocId], relevant: &BTreeSet<DocId>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, id) in result_ids.iter().enumerate() {
        if relevant.contains(id) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Run every benchmark query through `index` and average P@3, P@R and AP.
///
/// Relevant ids that do not name a document of the index are ignored.
pub fn evaluate(
    index: &InvertedIndex,
    benchmark: &Benchmark,
    use_refinements: bool,
) -> Result<Metrics> {
    if benchmark.is_empty() {
        return Err(Error::EmptyBenchmark);
    }

    let (mut sum_p3, mut sum_pr, mut sum_ap) = (0.0, 0.0, 0.0);
    for (query, listed) in benchmark.iter() {
        let relevant: BTreeSet<DocId> =
            listed.iter().copied().filter(|&id| index.contains_doc(id)).collect();
        let dropped = listed.len() - relevant.len();
        if dropped > 0 {
            tracing::warn!(query, dropped, "ignoring out-of-range relevant ids");
        }

        let keywords: Vec<&str> = query.split_whitespace().collect();
        let result_ids: Vec<DocId> = index
            .process_query(&keywords, use_refinements)
            .into_iter()
            .map(|p| p.doc_id)
            .collect();

        let p3 = precision_at_k(&result_ids, &relevant, 3);
        let pr = precision_at_k(&result_ids, &relevant, relevant.len());
        let ap = average_precision(&result_ids, &relevant);
        tracing::debug!(query, p3, pr, ap, "evaluated query");

        sum_p3 += p3;
        sum_pr += pr;
        sum_ap += ap;
    }

    let n = benchmark.len() as f64;
    Ok(Metrics { mp_at_3: sum_p3 / n, mp_at_r: sum_pr / n, map: sum_ap / n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn set(ids: &[DocId]) -> BTreeSet<DocId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn precision_at_k_examples() {
        let relevant = set(&[1, 2, 5, 6, 7, 8]);
        assert_eq!(precision_at_k(&[5, 3, 6, 1, 2], &relevant, 2), 0.5);
        assert_eq!(precision_at_k(&[5, 3, 6, 1, 2], &relevant, 4), 0.75);
    }

    #[test]
    fn short_result_list_is_penalized() {
        assert_eq!(precision_at_k(&[1], &set(&[1, 2]), 4), 0.25);
        assert_eq!(precision_at_k(&[], &set(&[1]), 3), 0.0);
        assert_eq!(precision_at_k(&[1], &set(&[1]), 0), 0.0);
    }

    #[test]
    fn average_precision_example() {
        let ap = average_precision(&[7, 17, 9, 42, 5], &set(&[5, 7, 12, 42]));
        assert!((ap - 0.525).abs() < 1e-12);
    }

    #[test]
    fn average_precision_edge_cases() {
        assert_eq!(average_precision(&[1, 2, 3], &set(&[])), 0.0);
        assert_eq!(average_precision(&[], &set(&[4])), 0.0);
        assert_eq!(average_precision(&[3, 1, 9], &set(&[1, 3])), 1.0);
    }

    #[test]
    fn refinements_flag_reaches_the_query_processor() {
        let mut lists = HashMap::new();
        lists.insert("foo".to_string(), vec![Posting::new(1, 0.2), Posting::new(3, 0.6)]);
        let bar = vec![Posting::new(1, 0.4), Posting::new(2, 0.7), Posting::new(3, 0.5)];
        lists.insert("bar".to_string(), bar);
        lists.insert("qux".to_string(), vec![Posting::new(4, 5.0)]);
        let idx = InvertedIndex::from_lists(lists, 4);
        let mut benchmark = Benchmark::new();
        benchmark.insert("foo bar qux", [1, 3]);

        // Plain ranking is [4, 3, 2, 1]; refined ranking is [3, 1, 4, 2].
        let plain = evaluate(&idx, &benchmark, false).unwrap();
        assert!((plain.mp_at_3 - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(plain.mp_at_r, 0.5);
        assert_eq!(plain.map, 0.5);

        let refined = evaluate(&idx, &benchmark, true).unwrap();
        assert!((refined.mp_at_3 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(refined.mp_at_r, 1.0);
        assert_eq!(refined.map, 1.0);
    }

    #[test]
    fn metrics_display() {
        let m = Metrics { mp_at_3: 2.0 / 3.0, mp_at_r: 5.0 / 6.0, map: 0.69444 };
        assert_eq!(m.to_string(), "MP@3 = 0.667, MP@R = 0.833, MAP = 0.694");
    }

    proptest! {
        #[test]
        fn precision_is_bounded(
            ids in prop::collection::vec(1u32..50, 0..30),
            rel in prop::collection::btree_set(1u32..50, 0..20),
            k in 0usize..40,
        ) {
            let p = precision_at_k(&ids, &rel, k);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn inserting_irrelevant_ids_earlier_never_helps(
            ids in prop::collection::vec(1u32..50, 0..30),
            rel in prop::collection::btree_set(1u32..50, 0..20),
            pos in 0usize..30,
            k in 1usize..40,
        ) {
            let before = precision_at_k(&ids, &rel, k);
            let mut worse = ids.clone();
            // 100 is outside the id range used for relevant documents.
            worse.insert(pos.min(ids.len()), 100);
            prop_assert!(precision_at_k(&worse, &rel, k) <= before);
        }

        #[test]
        fn perfect_ranking_has_unit_average_precision(
            rel in prop::collection::btree_set(1u32..50, 1..20),
            tail in prop::collection::vec(50u32..100, 0..10),
        ) {
            let ids: Vec<DocId> = rel.iter().copied().chain(tail).collect();
            prop_assert_eq!(average_precision(&ids, &rel), 1.0);
        }
    }
}
