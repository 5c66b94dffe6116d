use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::config::{DEFAULT_B, DEFAULT_K};
use search_core::{evaluate, top_k, Benchmark, Bm25Params, InvertedIndex, QueryMode, QueryOptions, Record};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a BM25 index over a TSV corpus, query it and evaluate it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Corpus path: a `<title>TAB<description>` file, or a directory of .tsv/.txt files
    #[arg(long)]
    corpus: PathBuf,
    /// BM25 length normalization, in [0, 1]
    #[arg(short, default_value_t = DEFAULT_B)]
    b: f64,
    /// BM25 term frequency saturation, >= 0 (`inf` disables saturation)
    #[arg(short, default_value_t = DEFAULT_K)]
    k: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and report its size
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Run one keyword query and print the best matches
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Number of results to print
        #[arg(long, default_value_t = 3)]
        top: usize,
        /// Rank documents matching more query words first
        #[arg(long, default_value_t = false)]
        refinements: bool,
        /// Require every keyword instead of any
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Query keywords
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Evaluate ranking quality against a `<query>TAB<ids>` benchmark
    Evaluate {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        benchmark: PathBuf,
        #[arg(long, default_value_t = false)]
        refinements: bool,
        /// Print metrics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { index } => {
            let idx = build_index(&index)?;
            println!("documents: {}", idx.num_docs());
            println!("words:     {}", idx.num_words());
            println!("avdl:      {:.3}", idx.avdl());
            Ok(())
        }
        Commands::Query { index, top, refinements, all, keywords } => {
            let idx = build_index(&index)?;
            let mode = if all { QueryMode::All } else { QueryMode::Any };
            let ranked = idx.process_query_with(&keywords, &QueryOptions { mode, use_refinements: refinements });
            if ranked.is_empty() {
                println!("no results");
            }
            for (rank, p) in top_k(&ranked, top).iter().enumerate() {
                let title = idx.record(p.doc_id).map(|r| r.title.as_str()).unwrap_or("");
                println!("{:>3}  {:>6}  {:>8.3}  {}", rank + 1, p.doc_id, p.score, title);
            }
            Ok(())
        }
        Commands::Evaluate { index, benchmark, refinements, json } => {
            let idx = build_index(&index)?;
            let f = File::open(&benchmark).with_context(|| format!("opening benchmark {}", benchmark.display()))?;
            let bench = Benchmark::from_reader(BufReader::new(f))?;
            let metrics = evaluate(&idx, &bench, refinements)?;
            tracing::info!(queries = bench.len(), %metrics, "evaluation complete");
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("{metrics}");
            }
            Ok(())
        }
    }
}

fn build_index(args: &IndexArgs) -> Result<InvertedIndex> {
    let params = Bm25Params::new(args.b, args.k)?;
    let files = corpus_files(&args.corpus)?;
    let mut records: Vec<Record> = Vec::new();
    for file in &files {
        read_records(file, &mut records)?;
    }
    tracing::info!(files = files.len(), records = records.len(), "read corpus");
    Ok(InvertedIndex::build(records, params)?)
}

/// Corpus files in sorted path order, so document ids do not depend on
/// directory listing order.
fn corpus_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "tsv" | "txt") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("corpus path {} does not exist", input.display());
    }
    Ok(files)
}

fn read_records(file: &Path, records: &mut Vec<Record>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening corpus {}", file.display()))?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        records.push(Record::parse_line(&line?));
    }
    Ok(())
}
