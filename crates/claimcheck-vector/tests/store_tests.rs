use claimcheck_core::error::Error;
use claimcheck_core::traits::Embedder;
use claimcheck_core::types::Chunk;
use claimcheck_embed::FakeEmbedder;
use claimcheck_vector::{build_index, store, BuildOutcome, Retriever};

fn chunks() -> Vec<Chunk> {
    let texts = [
        ("vitd", "Vitamin D supports calcium absorption and bone health in adults"),
        ("vitd", "Low vitamin D levels are common in winter months"),
        ("zinc", "Zinc lozenges may shorten the duration of the common cold"),
        ("omega", "Omega-3 fatty acids lower triglyceride levels"),
    ];
    let mut per_doc = std::collections::HashMap::new();
    texts
        .iter()
        .map(|(doc, text)| {
            let idx = per_doc.entry(*doc).or_insert(0usize);
            let c = Chunk {
                chunk_id: Chunk::make_id(doc, *idx),
                doc_id: (*doc).to_string(),
                title: doc.to_uppercase(),
                chunk_index: *idx,
                text: (*text).to_string(),
            };
            *idx += 1;
            c
        })
        .collect()
}

#[tokio::test]
async fn persisted_index_round_trips_records_and_vectors() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = FakeEmbedder::new(64);
    let chunks = chunks();

    let outcome = build_index(tmp.path(), "chunks", &chunks, &embedder, 2, false).await?;
    assert_eq!(outcome, BuildOutcome::Built { rows: 4 });

    let index = store::load(tmp.path(), "chunks").await?;
    assert_eq!(index.size(), 4);
    assert_eq!(index.dim(), 64);
    assert_eq!(index.embedder_id(), embedder.embedder_id());
    assert_eq!(index.records(), chunks.as_slice());
    for (i, c) in chunks.iter().enumerate() {
        let expected = embedder.embed_text(&c.text);
        let sim: f32 = expected.iter().zip(index.vector(i)).map(|(a, b)| a * b).sum();
        assert!((sim - 1.0).abs() < 1e-5, "row {i} drifted from its chunk");
    }

    let manifest = store::read_manifest(tmp.path(), "chunks").await?.expect("manifest");
    assert_eq!(manifest.rows, 4);
    assert_eq!(manifest.dim, 64);
    Ok(())
}

#[tokio::test]
async fn unchanged_chunks_skip_rebuild_and_force_rebuilds() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = FakeEmbedder::new(32);
    let chunks = chunks();

    build_index(tmp.path(), "chunks", &chunks, &embedder, 8, false).await?;
    let again = build_index(tmp.path(), "chunks", &chunks, &embedder, 8, false).await?;
    assert_eq!(again, BuildOutcome::Unchanged { rows: 4 });

    let forced = build_index(tmp.path(), "chunks", &chunks, &embedder, 8, true).await?;
    assert_eq!(forced, BuildOutcome::Built { rows: 4 });

    let fewer = &chunks[..2];
    let rebuilt = build_index(tmp.path(), "chunks", fewer, &embedder, 8, false).await?;
    assert_eq!(rebuilt, BuildOutcome::Built { rows: 2 });
    assert_eq!(store::load(tmp.path(), "chunks").await?.size(), 2);
    Ok(())
}

#[tokio::test]
async fn loading_without_a_build_reports_index_unavailable() {
    let tmp = tempfile::tempdir().expect("tmp");
    let err = store::load(tmp.path(), "chunks").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::IndexUnavailable(_))));

    let missing = tmp.path().join("nothing-here");
    let err = store::load(&missing, "chunks").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::IndexUnavailable(_))));
}

#[tokio::test]
async fn retriever_ranks_overlapping_chunk_first() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = FakeEmbedder::new(256);
    build_index(tmp.path(), "chunks", &chunks(), &embedder, 4, false).await?;
    let index = store::load(tmp.path(), "chunks").await?;

    let retriever = Retriever::new(Box::new(FakeEmbedder::new(256))).with_index(index)?;
    let hits = retriever.retrieve("zinc lozenges common cold duration", 2)?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].chunk_id, "zinc::chunk_0");
    assert_eq!(hits[0].rank, 1);
    assert_eq!(hits[1].rank, 2);
    assert!(hits[0].score >= hits[1].score);

    let all = retriever.retrieve("vitamin d", 50)?;
    assert_eq!(all.len(), 4);
    assert!(retriever.retrieve("vitamin d", 0)?.is_empty());
    Ok(())
}

#[test]
fn retriever_without_index_is_unavailable() {
    let retriever = Retriever::new(Box::new(FakeEmbedder::new(16)));
    assert!(matches!(retriever.retrieve("anything", 3), Err(Error::IndexUnavailable(_))));
}

#[test]
fn retriever_rejects_index_from_another_embedder() {
    let embedder = FakeEmbedder::new(16);
    let vectors = embedder.embed_batch(&["a".to_string()]).unwrap();
    let index = claimcheck_vector::SearchIndex::from_parts(chunks()[..1].to_vec(), vectors, "ollama:other:d16").unwrap();
    assert!(Retriever::new(Box::new(embedder)).with_index(index).is_err());
}
