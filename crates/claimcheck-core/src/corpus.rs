//! Line-delimited JSON streams and plain-text document loading.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Document;

/// Read every record of a JSONL file. Blank lines are ignored; malformed lines
/// are skipped with a warning.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(path = %path.display(), line = line_no + 1, error = %e, "skipping malformed record"),
        }
    }
    Ok(records)
}

/// Read a JSONL file where a malformed line is an error rather than a skip.
pub fn read_jsonl_strict<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(Error::from))
        .collect()
}

pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(fs::File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Load every `.txt` file under `root` as a [`Document`].
///
/// The doc id is the path relative to `root` without the extension, joined
/// with `/` (`minerals/magnesium`), so equal file names in different folders
/// stay distinct. The title is the first non-empty line.
pub fn load_text_dir(root: &Path) -> Result<Vec<Document>> {
    let files = list_txt_files(root);
    if files.is_empty() {
        tracing::warn!("No .txt files found under {}", root.display());
        return Ok(vec![]);
    }
    let mut docs = Vec::with_capacity(files.len());
    for file_path in &files {
        let text = read_file_content(file_path)?;
        let Some(doc_id) = relative_doc_id(root, file_path) else { continue };
        let title = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default().to_string();
        docs.push(Document { doc_id, title, source: "local".into(), text });
    }
    tracing::info!(files = docs.len(), root = %root.display(), "loaded text documents");
    Ok(docs)
}

/// `docs.jsonl` when `path` is a file, a directory of `.txt` files otherwise.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    if path.is_dir() { load_text_dir(path) } else { read_jsonl(path) }
}

fn relative_doc_id(root: &Path, file_path: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(root).unwrap_or(file_path).with_extension("");
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}
