use search_core::{evaluate, Benchmark, Bm25Params, DocId, Error, InvertedIndex, Posting, QueryMode, QueryOptions};

const CORPUS: &str = include_str!("fixtures/example.tsv");
const BENCHMARK: &str = include_str!("fixtures/example-benchmark.tsv");

fn build(b: f64, k: f64) -> InvertedIndex {
    InvertedIndex::from_reader(CORPUS.as_bytes(), Bm25Params::new(b, k).unwrap()).unwrap()
}

fn assert_postings(idx: &InvertedIndex, word: &str, expected: &[(DocId, f64)]) {
    let got: &[Posting] = idx.postings(word).unwrap_or_else(|| panic!("no postings for {word}"));
    assert_eq!(got.len(), expected.len(), "{word}: {got:?}");
    for (p, &(doc_id, score)) in got.iter().zip(expected) {
        assert_eq!(p.doc_id, doc_id, "{word}");
        assert!((p.score - score).abs() < 5e-4, "{word}: {p:?} vs {score}");
    }
}

#[test]
fn bm25_without_saturation_or_length_normalization() {
    let idx = build(0.0, f64::INFINITY);
    assert_eq!(idx.num_docs(), 4);
    assert_eq!(idx.num_words(), 6);
    assert_postings(&idx, "animated", &[(1, 0.415), (2, 0.415), (4, 0.415)]);
    assert_postings(&idx, "animation", &[(3, 2.0)]);
    assert_postings(&idx, "film", &[(2, 1.0), (4, 1.0)]);
    assert_postings(&idx, "movie", &[(1, 0.0), (2, 0.0), (3, 0.0), (4, 0.0)]);
    assert_postings(&idx, "non", &[(2, 2.0)]);
    assert_postings(&idx, "short", &[(3, 1.0), (4, 2.0)]);
}

#[test]
fn bm25_with_default_style_parameters() {
    let idx = build(0.75, 1.75);
    assert!((idx.avdl() - 3.75).abs() < 1e-12);
    assert_postings(&idx, "animated", &[(1, 0.459), (2, 0.402), (4, 0.358)]);
    assert_postings(&idx, "animation", &[(3, 2.211)]);
    assert_postings(&idx, "film", &[(2, 0.969), (4, 0.863)]);
    assert_postings(&idx, "movie", &[(1, 0.0), (2, 0.0), (3, 0.0), (4, 0.0)]);
    assert_postings(&idx, "non", &[(2, 1.938)]);
    assert_postings(&idx, "short", &[(3, 1.106), (4, 1.313)]);
}

#[test]
fn ranked_query_over_fixture() {
    let idx = build(0.75, 1.75);
    let ids: Vec<DocId> = idx.process_query(&["animated", "film"], false).iter().map(|p| p.doc_id).collect();
    assert_eq!(ids, [2, 4, 1]);
    let ids: Vec<DocId> = idx.process_query(&["short film"], false).iter().map(|p| p.doc_id).collect();
    assert_eq!(ids, [4, 3, 2]);

    let all = QueryOptions { mode: QueryMode::All, use_refinements: false };
    let ids: Vec<DocId> = idx.search("animated film", &all).iter().map(|p| p.doc_id).collect();
    assert_eq!(ids, [2, 4]);
}

#[test]
fn evaluates_benchmark_means() {
    let idx = build(0.75, 1.75);
    let benchmark = Benchmark::from_reader(BENCHMARK.as_bytes()).unwrap();
    let m = evaluate(&idx, &benchmark, false).unwrap();
    assert!((m.mp_at_3 - 0.667).abs() < 5e-4, "{m}");
    assert!((m.mp_at_r - 0.833).abs() < 5e-4, "{m}");
    assert!((m.map - 0.694).abs() < 5e-4, "{m}");
}

#[test]
fn refined_evaluation_over_fixture() {
    let idx = build(0.75, 1.75);
    let benchmark = Benchmark::from_reader(BENCHMARK.as_bytes()).unwrap();
    // Documents matching both words already lead on score here, so the
    // coordination refinement keeps the same rankings.
    let refined = evaluate(&idx, &benchmark, true).unwrap();
    assert!((refined.mp_at_3 - 0.667).abs() < 5e-4, "{refined}");
    assert!((refined.mp_at_r - 0.833).abs() < 5e-4, "{refined}");
    assert!((refined.map - 0.694).abs() < 5e-4, "{refined}");
    assert_eq!(refined, evaluate(&idx, &benchmark, false).unwrap());
}

#[test]
fn out_of_range_relevant_ids_are_ignored() {
    let idx = build(0.75, 1.75);
    let clean = Benchmark::from_reader(BENCHMARK.as_bytes()).unwrap();
    let noisy = "animated film\t0 1 3 4 99 -1\nshort film\t3 4 5 5000000000\n";
    let noisy = Benchmark::from_reader(noisy.as_bytes()).unwrap();
    assert_eq!(evaluate(&idx, &noisy, false).unwrap(), evaluate(&idx, &clean, false).unwrap());
}

#[test]
fn empty_inputs_are_distinct_failures() {
    let err = InvertedIndex::from_reader("".as_bytes(), Bm25Params::default()).unwrap_err();
    assert!(matches!(err, Error::EmptyCorpus));

    let idx = build(0.75, 1.75);
    let err = evaluate(&idx, &Benchmark::new(), false).unwrap_err();
    assert!(matches!(err, Error::EmptyBenchmark));
}

#[test]
fn records_keep_line_order() {
    let idx = build(0.75, 1.75);
    assert_eq!(idx.record(1).unwrap().title, "Movie 1");
    assert_eq!(idx.record(4).unwrap().description, "short animated film, short");
    assert!(idx.record(5).is_none());
}
