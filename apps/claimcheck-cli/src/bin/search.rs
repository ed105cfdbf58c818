use anyhow::Result;
use clap::Parser;

use claimcheck_cli::{init_tracing, preview, App};

/// Print the top-k chunks for a query.
#[derive(Parser)]
#[command(name = "claimcheck-search", version)]
struct Args {
    query: String,
    /// Number of results (default: retrieval.top_k)
    #[arg(short = 'k', long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::load()?;
    let rt = tokio::runtime::Runtime::new()?;
    let retriever = app.retriever(&rt)?;

    let k = args.limit.unwrap_or(app.settings.retrieval.top_k);
    let results = retriever.retrieve(&args.query, k)?;
    tracing::debug!(k, hits = results.len(), "search finished");
    println!("🔍 Found {} results for: \"{}\"", results.len(), args.query);
    for r in &results {
        println!("\n  {}. score={:.4}  doc={}  chunk={}", r.rank, r.score, r.doc_id, r.chunk_id);
        println!("     {}", preview(&r.text, 400));
    }
    Ok(())
}
