use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use claimcheck_cli::{init_tracing, App};
use claimcheck_core::chunker::{chunk_documents, ChunkingConfig};
use claimcheck_core::corpus::{load_documents, write_jsonl};

/// Split documents into overlapping chunks and write chunks.jsonl.
#[derive(Parser)]
#[command(name = "claimcheck-chunk", version)]
struct Args {
    /// docs.jsonl or a directory of .txt files (default: data.docs_path)
    input: Option<PathBuf>,
    /// Output JSONL (default: data.chunks_path)
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[arg(long)]
    max_chars: Option<usize>,
    #[arg(long)]
    overlap_chars: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::load()?;

    let input = args.input.unwrap_or_else(|| app.path(&app.settings.data.docs_path));
    let out = args.out.unwrap_or_else(|| app.path(&app.settings.data.chunks_path));
    let cfg = ChunkingConfig::new(
        args.max_chars.unwrap_or(app.settings.chunking.max_chars),
        args.overlap_chars.unwrap_or(app.settings.chunking.overlap_chars),
    )?;

    println!("📄 claimcheck-chunk\n==================");
    println!("Input: {}", input.display());
    let docs = load_documents(&input).with_context(|| format!("loading documents from {}", input.display()))?;
    tracing::info!(documents = docs.len(), "documents loaded");
    let chunks = chunk_documents(&docs, &cfg)?;
    write_jsonl(&out, &chunks).with_context(|| format!("writing {}", out.display()))?;

    println!("✅ {} documents → {} chunks (max {} chars, overlap {})", docs.len(), chunks.len(), cfg.max_chars, cfg.overlap_chars);
    println!("Saved: {}", out.display());
    Ok(())
}
