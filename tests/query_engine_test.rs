use pilum::config::IndexConfig;
use pilum::error::PilumError;
use pilum::index::{DocumentCatalog, IndexBuilder, InvertedLexicon, Posting};
use pilum::search::similarity::TermFrequencyRatio;
use pilum::search::{QueryEngine, Similarity};
use pilum::storage::{Storage, StorageOutput};
use pilum::storage::memory::MemoryStorage;

use rayon::prelude::*;
use std::io::Write;
use std::sync::Arc;

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn build(storage: Arc<dyn Storage>, catalog: &DocumentCatalog, lexicon: &InvertedLexicon) {
    IndexBuilder::new(storage, IndexConfig::default())
        .unwrap()
        .build(lexicon, catalog)
        .unwrap();
}

fn open(storage: Arc<dyn Storage>, similarity: Arc<dyn Similarity>) -> QueryEngine {
    QueryEngine::open(storage, &IndexConfig::default())
        .unwrap()
        .with_similarity(similarity)
}

/// Ten documents containing "w" with increasing term frequencies.
fn ten_matches() -> Arc<dyn Storage> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
    let mut catalog = DocumentCatalog::new();
    let mut lexicon = InvertedLexicon::new();
    for doc_id in 0..10 {
        catalog.insert(doc_id, format!("DOC{doc_id}"), 1.0).unwrap();
        lexicon.add_posting("w", Posting::new(doc_id, doc_id + 1));
    }
    build(storage.clone(), &catalog, &lexicon);
    storage
}

#[test]
fn test_tf_ratio_scenario() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
    let mut catalog = DocumentCatalog::new();
    catalog.insert(1, "DOC1", 2.0).unwrap();
    catalog.insert(2, "DOC2", 1.0).unwrap();
    let mut lexicon = InvertedLexicon::new();
    lexicon.add_posting("cat", Posting::new(1, 2));
    lexicon.add_posting("cat", Posting::new(2, 1));
    build(storage.clone(), &catalog, &lexicon);

    let engine = open(storage, Arc::new(TermFrequencyRatio));
    let result = engine.score(&terms(&["cat"]), 10).unwrap();

    let rows: Vec<(usize, i32, f64)> = result.iter().map(|h| (h.rank, h.doc_id, h.score)).collect();
    assert_eq!(rows, vec![(1, 1, 1.0), (2, 2, 1.0)]);
    assert_eq!(engine.resolve(1).unwrap().doc_no, "DOC1");
}

#[test]
fn test_top_k_limits_and_orders() {
    let engine = open(ten_matches(), Arc::new(TermFrequencyRatio));
    let result = engine.score(&terms(&["w"]), 3).unwrap();

    assert_eq!(result.len(), 3);
    let scores: Vec<f64> = result.iter().map(|h| h.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(result.hits[0].doc_id, 9);
}

#[test]
fn test_fewer_matches_than_k() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
    let mut catalog = DocumentCatalog::new();
    let mut lexicon = InvertedLexicon::new();
    for doc_id in 0..5 {
        catalog.insert(doc_id, format!("DOC{doc_id}"), 1.0).unwrap();
    }
    lexicon.add_posting("rare", Posting::new(1, 1));
    lexicon.add_posting("rare", Posting::new(3, 2));
    lexicon.add_posting("other", Posting::new(0, 1));
    build(storage.clone(), &catalog, &lexicon);

    let engine = open(storage, Arc::new(TermFrequencyRatio));
    let result = engine.score(&terms(&["rare"]), 5).unwrap();
    assert_eq!(result.len(), 2);
}

#[test]
fn test_bm25_prefers_rare_terms() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
    let mut catalog = DocumentCatalog::new();
    let mut lexicon = InvertedLexicon::new();
    for doc_id in 0..20 {
        catalog.insert(doc_id, format!("DOC{doc_id}"), 1.2).unwrap();
        lexicon.add_posting("common", Posting::new(doc_id, 1));
    }
    lexicon.add_posting("rare", Posting::new(7, 1));
    build(storage.clone(), &catalog, &lexicon);

    let engine = QueryEngine::open(storage, &IndexConfig::default()).unwrap();
    assert_eq!(engine.similarity_name(), "bm25");

    let result = engine.score(&terms(&["common", "rare"]), 3).unwrap();
    assert_eq!(result.hits[0].doc_id, 7);
    // The remaining documents tie on "common" and are ordered by id
    assert_eq!(result.hits[1].doc_id, 0);
    assert_eq!(result.hits[2].doc_id, 1);
}

#[test]
fn test_corrupt_postings_abort_only_the_query() {
    let storage = Arc::new(MemoryStorage::new_default());
    let mut catalog = DocumentCatalog::new();
    catalog.insert(0, "DOC0", 1.0).unwrap();
    catalog.insert(1, "DOC1", 1.0).unwrap();
    let mut lexicon = InvertedLexicon::new();
    lexicon.add_posting("aa", Posting::new(0, 1));
    lexicon.add_posting("zz", Posting::new(0, 1));
    lexicon.add_posting("zz", Posting::new(1, 1));
    build(storage.clone(), &catalog, &lexicon);

    let engine = open(storage.clone(), Arc::new(TermFrequencyRatio));

    // "aa" occupies bytes [0, 8), "zz" [8, 24): cut "zz" short
    let bytes = storage.read_all("postings.bin").unwrap();
    let mut output = storage.create_output("postings.bin").unwrap();
    output.write_all(&bytes[..16]).unwrap();
    output.close().unwrap();

    let err = engine.score(&terms(&["zz"]), 10).unwrap_err();
    assert!(matches!(err, PilumError::CorruptIndex(_)));
    assert!(err.is_query_scoped());

    let result = engine.score(&terms(&["aa"]), 10).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.hits[0].doc_id, 0);
}

#[test]
fn test_concurrent_queries() {
    let engine = open(ten_matches(), Arc::new(TermFrequencyRatio));
    let expected = engine.score(&terms(&["w"]), 4).unwrap();

    let results: Vec<_> = (0..32)
        .into_par_iter()
        .map(|_| engine.score(&terms(&["w"]), 4).unwrap())
        .collect();

    assert!(results.iter().all(|r| *r == expected));
}

#[test]
fn test_closure_similarity() {
    let engine = open(
        ten_matches(),
        Arc::new(|_norm: f64, tf: i32, _df: i32| -(tf as f64)),
    );
    let result = engine.score(&terms(&["w"]), 1).unwrap();
    assert_eq!(result.hits[0].doc_id, 0);
}
