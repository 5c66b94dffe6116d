use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::config::{DEFAULT_B, DEFAULT_K};
use search_core::Bm25Params;
use server::{build_app, load_index};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file, one `<title>TAB<description>` record per line
    #[arg(long)]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// BM25 length normalization, in [0, 1]
    #[arg(short, default_value_t = DEFAULT_B)]
    b: f64,
    /// BM25 term frequency saturation (`inf` disables saturation)
    #[arg(short, default_value_t = DEFAULT_K)]
    k: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let params = Bm25Params::new(args.b, args.k)?;
    let index = load_index(&args.corpus, params)?;
    let app: Router = build_app(index);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
