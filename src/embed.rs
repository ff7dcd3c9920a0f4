//! Embedding provider seam for the semantic scoring profile.
//!
//! Semantic similarity is an *optional* collaborator: the scorer works
//! entirely lexically without it. Callers that have an embedding model (a
//! local ONNX runtime, a remote API, a test fixture) inject it through
//! [`crate::config::AnalysisConfigBuilder::embedder`]; when none is
//! configured, or a call fails, the semantic weight is folded into keyword
//! overlap and the run continues with a warning.
//!
//! The trait is `Send + Sync` so one provider instance can be shared by an
//! `Arc` across callers, mirroring how the host application is expected to
//! own the model.

use thiserror::Error;

/// Failure modes of an embedding call.
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// The backend is not reachable or not initialised.
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but could not embed this text.
    #[error("embedding request failed: {0}")]
    Failed(String),
}

/// Produces fixed-dimension embeddings for relevance scoring.
///
/// Implementations must return vectors of a consistent dimension for the
/// lifetime of a run; the scorer compares each section vector against the
/// query vector with [`cosine_similarity`].
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for empty, mismatched-dimension, or zero-norm inputs rather
/// than NaN, so a misbehaving provider can never poison a relevance score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
