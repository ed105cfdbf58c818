//! LanceDB persistence for a [`SearchIndex`].
//!
//! Each chunk is one row holding its metadata and its vector, plus an explicit
//! `row` position, so vectors can never drift away from the chunk they embed.
//! A small `<table>_meta` table records which embedder built the index.

use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use claimcheck_core::error::Error;
use claimcheck_core::types::Chunk;

use crate::index::SearchIndex;
use crate::schema::{build_chunk_schema, build_meta_schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexManifest {
    pub embedder_id: String,
    pub dim: usize,
    pub rows: usize,
    pub fingerprint: String,
    pub built_at: String,
}

pub fn meta_table_name(table: &str) -> String {
    format!("{table}_meta")
}

pub async fn open_db(dir: &Path) -> Result<Connection> {
    Ok(connect(dir.to_string_lossy().as_ref()).execute().await?)
}

async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

/// Replace whatever is stored under `table` with `index`.
pub async fn persist(dir: &Path, table: &str, index: &SearchIndex, fingerprint: &str) -> Result<()> {
    if index.size() == 0 {
        return Err(anyhow!("refusing to persist an empty index"));
    }
    std::fs::create_dir_all(dir)?;
    for name in [table.to_string(), meta_table_name(table)] {
        let path = dir.join(format!("{name}.lance"));
        if path.exists() {
            std::fs::remove_dir_all(&path)?;
        }
    }

    let conn = open_db(dir).await?;
    let batch = chunk_batch(index)?;
    let schema = batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    conn.create_table(table, reader).execute().await?;

    let manifest = IndexManifest {
        embedder_id: index.embedder_id().to_string(),
        dim: index.dim(),
        rows: index.size(),
        fingerprint: fingerprint.to_string(),
        built_at: Utc::now().to_rfc3339(),
    };
    write_manifest(&conn, table, &manifest).await?;
    tracing::info!(table, rows = manifest.rows, dim = manifest.dim, embedder = %manifest.embedder_id, "index persisted");
    Ok(())
}

/// Load the index stored under `table`.
///
/// Fails with [`Error::IndexUnavailable`] when nothing was built and with
/// [`Error::MetadataMismatch`] when some chunk rows lack a vector.
pub async fn load(dir: &Path, table: &str) -> Result<SearchIndex> {
    if !dir.exists() {
        return Err(Error::IndexUnavailable(format!("no index store at {}", dir.display())).into());
    }
    let conn = open_db(dir).await?;
    if !table_exists(&conn, table).await? {
        return Err(Error::IndexUnavailable(format!("table '{table}' not found in {}", dir.display())).into());
    }
    let manifest = read_manifest_from(&conn, table)
        .await?
        .ok_or_else(|| Error::IndexUnavailable(format!("table '{table}' has no manifest; rebuild the index")))?;

    let tbl = conn.open_table(table).execute().await?;
    let total = tbl.count_rows(None).await?;
    let mut rows: Vec<(i64, Chunk, Option<Vec<f32>>)> = Vec::with_capacity(total);
    if total > 0 {
        let mut stream = tbl.query().limit(total).execute().await?;
        while let Some(batch) = stream.try_next().await? {
            rows.extend(decode_rows(&batch)?);
        }
    }
    rows.sort_by_key(|r| r.0);

    let mut records = Vec::with_capacity(rows.len());
    let mut vectors = Vec::with_capacity(rows.len());
    for (_, chunk, vector) in rows {
        records.push(chunk);
        if let Some(v) = vector {
            vectors.push(v);
        }
    }
    if records.len() != manifest.rows {
        return Err(Error::IndexUnavailable(format!(
            "table '{table}' holds {} rows but its manifest lists {}; rebuild the index",
            records.len(),
            manifest.rows
        ))
        .into());
    }
    let index = SearchIndex::from_parts(records, vectors, manifest.embedder_id.clone())?;
    if index.dim() != manifest.dim {
        return Err(Error::DimensionMismatch { expected: manifest.dim, actual: index.dim() }.into());
    }
    tracing::info!(table, rows = index.size(), dim = index.dim(), "index loaded");
    Ok(index)
}

/// Manifest of a stored index, or `None` if nothing is stored there yet.
pub async fn read_manifest(dir: &Path, table: &str) -> Result<Option<IndexManifest>> {
    if !dir.exists() {
        return Ok(None);
    }
    let conn = open_db(dir).await?;
    read_manifest_from(&conn, table).await
}

async fn read_manifest_from(conn: &Connection, table: &str) -> Result<Option<IndexManifest>> {
    let name = meta_table_name(table);
    if !table_exists(conn, &name).await? {
        return Ok(None);
    }
    let t = conn.open_table(&name).execute().await?;
    let mut entries = HashMap::new();
    let mut stream = t.query().limit(64).execute().await?;
    while let Some(batch) = stream.try_next().await? {
        let keys = column::<StringArray>(&batch, "key")?;
        let values = column::<StringArray>(&batch, "value")?;
        for i in 0..batch.num_rows() {
            entries.insert(keys.value(i).to_string(), values.value(i).to_string());
        }
    }
    let get = |key: &str| entries.get(key).cloned().ok_or_else(|| anyhow!("manifest of '{table}' is missing '{key}'"));
    Ok(Some(IndexManifest {
        embedder_id: get("embedder_id")?,
        dim: get("dim")?.parse()?,
        rows: get("rows")?.parse()?,
        fingerprint: get("fingerprint")?,
        built_at: get("built_at")?,
    }))
}

async fn write_manifest(conn: &Connection, table: &str, manifest: &IndexManifest) -> Result<()> {
    let entries = [
        ("embedder_id", manifest.embedder_id.clone()),
        ("dim", manifest.dim.to_string()),
        ("rows", manifest.rows.to_string()),
        ("fingerprint", manifest.fingerprint.clone()),
        ("built_at", manifest.built_at.clone()),
    ];
    let now = Utc::now().timestamp_millis();
    let rb = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from(entries.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(entries.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>())),
            Arc::new(TimestampMillisecondArray::from(vec![now; entries.len()])),
        ],
    )?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(rb)].into_iter(), build_meta_schema()));
    conn.create_table(meta_table_name(table), reader).execute().await?;
    Ok(())
}

fn chunk_batch(index: &SearchIndex) -> Result<RecordBatch> {
    let dim = i32::try_from(index.dim())?;
    let records = index.records();
    let vectors: Vec<Option<Vec<Option<f32>>>> =
        (0..records.len()).map(|i| Some(index.vector(i).iter().copied().map(Some).collect())).collect();
    let record_batch = RecordBatch::try_new(
        build_chunk_schema(dim),
        vec![
            Arc::new(Int64Array::from((0..records.len() as i64).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|c| c.chunk_id.clone()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|c| c.doc_id.clone()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|c| c.title.clone()).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(records.iter().map(|c| c.chunk_index as i32).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|c| c.text.clone()).collect::<Vec<_>>())),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
        ],
    )?;
    Ok(record_batch)
}

fn decode_rows(batch: &RecordBatch) -> Result<Vec<(i64, Chunk, Option<Vec<f32>>)>> {
    let row = column::<Int64Array>(batch, "row")?;
    let chunk_id = column::<StringArray>(batch, "chunk_id")?;
    let doc_id = column::<StringArray>(batch, "doc_id")?;
    let title = column::<StringArray>(batch, "title")?;
    let chunk_index = column::<Int32Array>(batch, "chunk_index")?;
    let text = column::<StringArray>(batch, "text")?;
    let vector = column::<FixedSizeListArray>(batch, "vector")?;

    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let chunk = Chunk {
            chunk_id: chunk_id.value(i).to_string(),
            doc_id: doc_id.value(i).to_string(),
            title: title.value(i).to_string(),
            chunk_index: usize::try_from(chunk_index.value(i))?,
            text: text.value(i).to_string(),
        };
        let v = if vector.is_valid(i) {
            Some(vector.value(i).as_primitive::<Float32Type>().values().to_vec())
        } else {
            None
        };
        out.push((row.value(i), chunk, v));
    }
    Ok(out)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow!("column '{name}' missing or has an unexpected type"))
}
