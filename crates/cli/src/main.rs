//! webdex CLI — crawl, index, and query from the terminal.
//!
//! Flags compose freely in one invocation: `-url` crawls, `-path` indexes local text
//! files, `-query`/`-results` answer queries, `-index`/`-counts` dump the index, and
//! `-port` mounts the web UI — all against the same in-process shared index.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use webdex_core::crawler::Crawler;
use webdex_core::fs_index;
use webdex_core::json;
use webdex_core::locked_index::LockedIndex;
use webdex_core::query::QueryProcessor;
use webdex_core::queue::WorkQueue;

const DEFAULT_LIMIT: usize = 50;
const DEFAULT_THREADS: usize = 5;
const DEFAULT_PORT: u16 = 8080;

/// webdex — a contextual search engine: crawl a seed page or index local text files,
/// then query the resulting inverted index.
#[derive(Parser)]
#[command(name = "webdex", version, about)]
struct Cli {
    /// Build the index from text files under PATH (recursive; `.txt`/`.text` only).
    #[arg(long = "path", value_name = "PATH")]
    path: Option<PathBuf>,

    /// Crawl from seed URL.
    #[arg(long = "url", value_name = "URL")]
    url: Option<String>,

    /// Maximum locations to index via crawl (ignored without `-url`).
    #[arg(long = "limit", value_name = "N", default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Worker pool size; used whenever any multithreaded flag is set.
    #[arg(long = "threads", value_name = "N", default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Start the web UI on PORT (implies multithreaded mode).
    #[arg(long = "port", value_name = "N", num_args = 0..=1, default_missing_value = "8080")]
    port: Option<u16>,

    /// Write the index as JSON to PATH (default index.json).
    #[arg(long = "index", value_name = "PATH", num_args = 0..=1, default_missing_value = "index.json")]
    index_out: Option<PathBuf>,

    /// Write location->count JSON to PATH (default counts.json).
    #[arg(long = "counts", value_name = "PATH", num_args = 0..=1, default_missing_value = "counts.json")]
    counts_out: Option<PathBuf>,

    /// Process queries line-by-line from FILE.
    #[arg(long = "query", value_name = "FILE")]
    query: Option<PathBuf>,

    /// Use exact search instead of prefix search for `-query`.
    #[arg(long = "exact")]
    exact: bool,

    /// Write query->results JSON to PATH (default results.json).
    #[arg(long = "results", value_name = "PATH", num_args = 0..=1, default_missing_value = "results.json")]
    results_out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("webdex=info")),
        )
        .init();

    let cli = Cli::parse();
    let multithreaded = cli.url.is_some() || cli.path.is_some() || cli.port.is_some();
    let threads = if multithreaded { cli.threads.max(1) } else { 1 };

    let index = Arc::new(LockedIndex::new());
    let queue = WorkQueue::new(threads);

    if let Some(path) = &cli.path {
        tracing::info!(path = %path.display(), "indexing local text files");
        fs_index::index_path(Arc::clone(&index), &queue, path);
    }

    if let Some(url) = &cli.url {
        tracing::info!(url, limit = cli.limit, "crawling from seed");
        let crawler = Crawler::new(Arc::clone(&index), Arc::clone(&queue), cli.limit);
        crawler.crawl(url);
    }

    if let Some(query_path) = &cli.query {
        let file = match File::open(query_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("error: cannot open query file {}: {e}", query_path.display());
                std::process::exit(1);
            }
        };
        let processor = QueryProcessor::new(Arc::clone(&index), Arc::clone(&queue));
        if let Err(e) = processor.process_queries(file, cli.exact) {
            eprintln!("error: failed reading query file: {e}");
            std::process::exit(1);
        }

        if let Some(results_path) = &cli.results_out {
            let json = json::results_to_json(&processor.results());
            write_output(results_path, &json);
        }
    }

    if let Some(index_path) = &cli.index_out {
        let json = json::index_to_json(&index.snapshot_terms());
        write_output(index_path, &json);
    }

    if let Some(counts_path) = &cli.counts_out {
        let json = json::counts_to_json(&index.snapshot_counts());
        write_output(counts_path, &json);
    }

    if let Some(port) = cli.port {
        let port = if port == 0 { DEFAULT_PORT } else { port };
        tracing::info!(port, "starting web UI");
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to start async runtime: {e}");
            std::process::exit(1);
        });
        runtime.block_on(webdex_server::run_server(Arc::clone(&index), port));
    }
}

fn write_output(path: &PathBuf, contents: &str) {
    match File::create(path).and_then(|mut f| f.write_all(contents.as_bytes())) {
        Ok(()) => tracing::info!(path = %path.display(), "wrote output"),
        Err(e) => eprintln!("error: failed to write {}: {e}", path.display()),
    }
}
