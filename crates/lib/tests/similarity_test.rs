//! # Similarity Scorer Tests
//!
//! Verifies the cosine scoring primitives the canned matching stage is
//! built on: determinism, stable tie-breaking, and threshold decisions.

use mali::similarity::{best_match, cosine_similarity, normalize, Thresholds};

#[test]
fn test_cosine_similarity_of_unit_vectors() {
    let a = vec![1.0, 0.0];
    let b = vec![0.0, 1.0];
    assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&a, &b).abs() < 1e-6);

    let c = vec![0.6, 0.8];
    assert!((cosine_similarity(&a, &c) - 0.6).abs() < 1e-6);
}

#[test]
fn test_best_match_returns_argmax() {
    let query = vec![1.0, 0.0];
    let corpus = vec![
        vec![0.0, 1.0],
        vec![0.6, 0.8],
        vec![0.8, 0.6],
        vec![0.0, -1.0],
    ];

    let (index, score) = best_match(&query, &corpus).expect("corpus is non-empty");
    assert_eq!(index, 2);
    assert!((score - 0.8).abs() < 1e-6);
}

#[test]
fn test_best_match_is_deterministic() {
    let query = vec![0.6, 0.8];
    let corpus = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]];

    let first = best_match(&query, &corpus);
    for _ in 0..10 {
        assert_eq!(best_match(&query, &corpus), first);
    }
}

#[test]
fn test_best_match_breaks_ties_by_first_occurrence() {
    let query = vec![1.0, 0.0];
    // Entries 0 and 2 score identically; the earlier one must win.
    let corpus = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];

    let (index, _) = best_match(&query, &corpus).expect("corpus is non-empty");
    assert_eq!(index, 0);
}

#[test]
fn test_best_match_on_empty_corpus_is_none() {
    let query = vec![1.0, 0.0];
    assert_eq!(best_match(&query, &[]), None);
}

#[test]
fn test_normalize_scales_to_unit_length() {
    let vector = normalize(vec![3.0, 4.0]).expect("non-zero vector");
    assert!((vector[0] - 0.6).abs() < 1e-6);
    assert!((vector[1] - 0.8).abs() < 1e-6);

    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-6);
}

#[test]
fn test_normalize_rejects_zero_vector() {
    assert!(normalize(vec![0.0, 0.0, 0.0]).is_none());
}

#[test]
fn test_threshold_decisions_are_strict() {
    let thresholds = Thresholds::default();

    assert!(!thresholds.accepts_canned(0.8));
    assert!(thresholds.accepts_canned(0.81));
    assert!(!thresholds.accepts_name_query(0.7));
    assert!(thresholds.accepts_name_query(0.71));
}

#[test]
fn test_threshold_defaults() {
    let thresholds = Thresholds::default();
    assert!((thresholds.canned_match - 0.8).abs() < 1e-6);
    assert!((thresholds.name_query - 0.7).abs() < 1e-6);
}
