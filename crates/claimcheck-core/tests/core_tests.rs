use std::fs;
use tempfile::TempDir;

use claimcheck_core::chunker::{chunk_documents, ChunkingConfig};
use claimcheck_core::corpus::{load_documents, read_jsonl, write_jsonl};
use claimcheck_core::types::{Chunk, Document};

#[test]
fn docs_jsonl_skips_blank_and_malformed_lines() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docs.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"doc_id":"vitd","title":"Vitamin D","source":"NIH ODS","text":"Vitamin D helps absorb calcium."}"#,
            "\n\n",
            "not json at all\n",
            r#"{"doc_id":"zinc","title":"Zinc","source":"NIH ODS","text":"Zinc supports immune function."}"#,
            "\n"
        ),
    )
    .unwrap();

    let docs = load_documents(&path).expect("load docs");
    let ids: Vec<_> = docs.iter().map(|d| d.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["vitd", "zinc"]);
}

#[test]
fn text_directory_becomes_documents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("minerals")).unwrap();
    fs::write(dir.join("minerals/magnesium.txt"), "\nMagnesium\nInvolved in 300 enzyme systems.").unwrap();
    fs::write(dir.join("notes.md"), "ignored").unwrap();

    let docs = load_documents(dir).expect("load dir");
    assert_eq!(docs.len(), 1, "only .txt files are documents");
    assert_eq!(docs[0].doc_id, "minerals/magnesium");
    assert_eq!(docs[0].title, "Magnesium");
}

#[test]
fn chunk_stream_is_reproducible_across_runs() {
    let tmp = TempDir::new().unwrap();
    let docs = vec![
        Document { doc_id: "a".into(), title: "A".into(), source: "s".into(), text: "x".repeat(2500) },
        Document { doc_id: "b".into(), title: "B".into(), source: "s".into(), text: "short".into() },
    ];
    let config = ChunkingConfig::default();
    let first = chunk_documents(&docs, &config).unwrap();
    let path = tmp.path().join("processed/chunks.jsonl");
    write_jsonl(&path, &first).unwrap();

    let read_back: Vec<Chunk> = read_jsonl(&path).unwrap();
    assert_eq!(read_back, chunk_documents(&docs, &config).unwrap());
    assert_eq!(read_back.iter().filter(|c| c.doc_id == "a").count(), 3);

    let mut ids: Vec<_> = read_back.iter().map(|c| c.chunk_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), read_back.len(), "chunk ids are unique");
}

#[test]
fn same_file_name_in_two_folders_keeps_chunk_ids_unique() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("a")).unwrap();
    fs::create_dir_all(dir.join("b")).unwrap();
    fs::write(dir.join("a/magnesium.txt"), "Magnesium\nMuscle function.").unwrap();
    fs::write(dir.join("b/magnesium.txt"), "Magnesium\nSleep quality.").unwrap();

    let docs = load_documents(dir).expect("load dir");
    let doc_ids: Vec<_> = docs.iter().map(|d| d.doc_id.as_str()).collect();
    assert_eq!(doc_ids, vec!["a/magnesium", "b/magnesium"]);

    let chunks = chunk_documents(&docs, &ChunkingConfig::default()).unwrap();
    let ids: Vec<_> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids, vec!["a/magnesium::chunk_0", "b/magnesium::chunk_0"]);
}
