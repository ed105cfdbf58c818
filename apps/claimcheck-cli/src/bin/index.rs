use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use claimcheck_cli::{init_tracing, App};
use claimcheck_core::corpus::read_jsonl;
use claimcheck_core::types::Chunk;
use claimcheck_vector::{embed_chunks, fingerprint, is_current, store, SearchIndex};

/// Embed chunks.jsonl and persist the vector index.
#[derive(Parser)]
#[command(name = "claimcheck-index", version)]
struct Args {
    /// Chunk JSONL (default: data.chunks_path)
    chunks: Option<PathBuf>,
    /// Rebuild even when the stored index matches
    #[arg(short, long)]
    force: bool,
    /// Index only the first N chunks
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::load()?;

    let chunks_path = args.chunks.unwrap_or_else(|| app.path(&app.settings.data.chunks_path));
    let dir = app.index_dir();
    let table = app.settings.retrieval.table.as_str();

    let mut chunks: Vec<Chunk> = read_jsonl(&chunks_path).with_context(|| format!("reading {}", chunks_path.display()))?;
    if let Some(limit) = args.limit {
        println!("🔢 Limiting indexing to {limit} chunks");
        chunks.truncate(limit);
    }
    if chunks.is_empty() {
        bail!("no chunks in {}; run claimcheck-chunk first", chunks_path.display());
    }

    println!("🧮 claimcheck-index\n==================");
    println!("Chunks: {} ({})", chunks.len(), chunks_path.display());
    println!("Index:  {} [{}]", dir.display(), table);

    let embedder = app.embedder()?;
    let fp = fingerprint(&chunks, embedder.embedder_id());
    let rt = tokio::runtime::Runtime::new()?;
    let manifest = rt.block_on(store::read_manifest(&dir, table))?;
    tracing::info!(embedder = embedder.embedder_id(), fingerprint = %fp, force = args.force, "checking stored index");
    if !args.force && is_current(manifest.as_ref(), &fp, chunks.len()) {
        println!("✅ Index already up to date ({} rows, {}); use --force to rebuild", chunks.len(), embedder.embedder_id());
        return Ok(());
    }

    let vectors = embed_chunks(&chunks, embedder.as_ref(), app.settings.embedding.batch_size)?;
    let index = SearchIndex::from_parts(chunks, vectors, embedder.embedder_id())?;
    rt.block_on(store::persist(&dir, table, &index, &fp))?;

    println!("\n✅ Indexed {} chunks (dim {}, {})", index.size(), index.dim(), index.embedder_id());
    println!("💡 To search, use: claimcheck-search '<query>'");
    Ok(())
}
