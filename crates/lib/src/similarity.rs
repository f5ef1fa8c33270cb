//! # Similarity Scoring
//!
//! Cosine similarity over unit-normalized embedding vectors. Because every
//! vector produced by the embedding provider is normalized to unit length, a
//! plain dot product is the cosine score.

use serde::Deserialize;

/// Decision thresholds for the resolution pipeline.
///
/// `canned_match` favors precision: a false canned reply is worse than
/// falling through to the generative model. `name_query` favors recall,
/// since the cost of repeating the user's known name is low.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Thresholds {
    #[serde(default = "default_canned_match")]
    pub canned_match: f32,
    #[serde(default = "default_name_query")]
    pub name_query: f32,
}

fn default_canned_match() -> f32 {
    0.8
}

fn default_name_query() -> f32 {
    0.7
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            canned_match: default_canned_match(),
            name_query: default_name_query(),
        }
    }
}

impl Thresholds {
    /// Whether a score is strong enough to return a canned reply.
    pub fn accepts_canned(&self, score: f32) -> bool {
        score > self.canned_match
    }

    /// Whether a score is strong enough to treat the utterance as a
    /// name question.
    pub fn accepts_name_query(&self, score: f32) -> bool {
        score > self.name_query
    }
}

/// Computes the cosine similarity of two unit vectors as their dot product.
///
/// Vectors of unequal length are compared over their shared prefix, which
/// can only happen when the embedding model changed between corpus and
/// query; scores then degrade instead of panicking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Returns the index and score of the corpus vector most similar to `query`.
///
/// The argmax is stable: ties are broken by the first occurrence in corpus
/// order, so repeated calls over a fixed corpus are deterministic. Returns
/// `None` for an empty corpus.
pub fn best_match(query: &[f32], corpus: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, candidate) in corpus.iter().enumerate() {
        let score = cosine_similarity(query, candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Scales a vector to unit length so dot products equal cosine similarity.
///
/// Returns `None` for a zero vector, which has no direction to normalize.
pub fn normalize(mut vector: Vec<f32>) -> Option<Vec<f32>> {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    for value in &mut vector {
        *value /= norm;
    }
    Some(vector)
}
