//! Dense vector helpers: L2 normalization and dot product.
//!
//! All vectors flowing through the recommendation core are assumed
//! L2-normalized (`‖v‖₂ = 1`), so that inner product equals cosine
//! similarity. See `normalize` for the single normalization routine
//! every vector-producing boundary (the Embedder client, the ANN index's
//! `Add`) funnels through.

/// A dense, fixed-dimension vector. A thin alias rather than a newtype:
/// callers pass `Vec<f32>` around freely, matching the teacher's
/// `DenseRetriever` convention of plain `Vec<f32>` embeddings.
pub type Vector = Vec<f32>;

/// Dot product of two equal-length vectors.
///
/// For L2-normalized inputs this is the cosine similarity.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm (`sqrt(sum(x^2))`) of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalize a vector to unit L2 norm in place.
///
/// Divides every component by the true L2 norm (not its square — an
/// earlier implementation this one is descended from divided by the
/// squared norm on one code path; that bug is not reproduced here).
/// A zero vector is left untouched rather than producing NaNs.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Returns a normalized copy of `v`.
pub fn normalized(v: &[f32]) -> Vector {
    let mut out = v.to_vec();
    normalize(&mut out);
    out
}

/// Cosine similarity between two vectors, assuming both are L2-normalized.
///
/// Falls back to explicit normalization in the denominator so the result
/// stays correct even if a caller hands in a non-normalized vector; callers
/// on the hot path (candidate scoring) pre-normalize and get the cheaper
/// `dot` directly.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let na = l2_norm(a);
    let nb = l2_norm(b);
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot(a, b) / (na * nb)
}
