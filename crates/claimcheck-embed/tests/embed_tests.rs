use claimcheck_core::norm::dot;
use claimcheck_embed::{Embedder, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(384);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384, "embedding dim is 384");
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.embedder_id(), "fake:xxh64:d384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn shared_words_score_higher_than_disjoint_text() {
    let embedder = FakeEmbedder::new(256);
    let claim = embedder.embed_text("Vitamin D supports calcium absorption");
    let related = embedder.embed_text("Vitamin D helps the body absorb calcium");
    let unrelated = embedder.embed_text("Zinc lozenges during colds");
    assert!(dot(&claim, &related) > dot(&claim, &unrelated));
}
