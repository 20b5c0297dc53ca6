//! Deterministic, network-free embedding projector.
//!
//! No learned parameters are stored. Projection weights are a closed-form
//! function of index positions on a sine/cosine lattice, so the same input
//! text always yields identical output bytes without shipping a model file.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::f64::consts::PI;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::EmbeddingProvider;

/// Bag-of-words feature width before projection.
const FEATURE_DIM: usize = 512;
/// Hidden layer width of the two-layer projection.
const HIDDEN_DIM: usize = 256;

/// Tokenizes on non-alphanumeric boundaries, lowercased.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Folds tokens into a signed-hash bag-of-words feature vector.
///
/// Each token contributes +1 or -1 to one of `FEATURE_DIM` buckets, the sign
/// and bucket both taken from one hash so collisions partially cancel rather
/// than always reinforcing (the "signed" half of feature hashing).
fn signed_hash_bow(tokens: &[String]) -> [f64; FEATURE_DIM] {
    let mut bow = [0.0_f64; FEATURE_DIM];
    for token in tokens {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let h = hasher.finish();
        let bucket = (h % FEATURE_DIM as u64) as usize;
        let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
        bow[bucket] += sign;
    }
    bow
}

/// Deterministic lattice weight for a connection between position `i` (of
/// size `n_i`) and position `j` (of size `n_j`).
fn lattice_weight(i: usize, n_i: usize, j: usize, n_j: usize) -> f64 {
    let a = ((i + 1) as f64 * PI) / n_i as f64;
    let b = ((j + 1) as f64 * PI) / n_j as f64;
    (a.sin() * b.cos() + a.cos() * b.sin()) / 2.0
}

fn gelu(x: f64) -> f64 {
    0.5 * x * (1.0 + (0.797_884_56 * (x + 0.044_715 * x.powi(3))).tanh())
}

/// Offline deterministic embedding provider.
///
/// Tokenizes input, builds a signed-hash bag-of-words vector, passes it
/// through a linear+tanh layer then a linear+GELU layer, and L2-normalizes
/// the result to the configured output dimension.
#[derive(Debug, Clone, Copy)]
pub struct OfflineProjector {
    dimension: usize,
}

impl OfflineProjector {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn project(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        let bow = signed_hash_bow(&tokens);

        let mut hidden = [0.0_f64; HIDDEN_DIM];
        for (h, slot) in hidden.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (f, value) in bow.iter().enumerate() {
                acc += value * lattice_weight(h, HIDDEN_DIM, f, FEATURE_DIM);
            }
            *slot = acc.tanh();
        }

        let mut output = vec![0.0_f64; self.dimension];
        for (d, slot) in output.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (h, value) in hidden.iter().enumerate() {
                acc += value * lattice_weight(d, self.dimension, h, HIDDEN_DIM);
            }
            *slot = gelu(acc);
        }

        let norm = output.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            output.iter().map(|v| (v / norm) as f32).collect()
        } else {
            vec![0.0; self.dimension]
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OfflineProjector {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::EmbeddingProvider(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.project(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.project_checked(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

impl OfflineProjector {
    fn project_checked(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::EmbeddingProvider(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.project(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_input_yields_identical_output() {
        let projector = OfflineProjector::new(384);
        let a = projector.embed("select * from orders").await.unwrap();
        let b = projector.embed("select * from orders").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn output_has_configured_dimension_and_unit_norm() {
        let projector = OfflineProjector::new(128);
        let v = projector.embed("the quick brown fox").await.unwrap();
        assert_eq!(v.len(), 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn different_inputs_yield_different_output() {
        let projector = OfflineProjector::new(64);
        let a = projector.embed("customers table").await.unwrap();
        let b = projector.embed("orders table").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let projector = OfflineProjector::new(64);
        assert!(projector.embed("").await.is_err());
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let projector = OfflineProjector::new(32);
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let batch = projector.embed_batch(&texts).await.unwrap();
        for (text, vector) in texts.iter().zip(batch.iter()) {
            assert_eq!(&projector.embed(text).await.unwrap(), vector);
        }
    }
}
