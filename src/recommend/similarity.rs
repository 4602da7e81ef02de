use ndarray::{Array1, ArrayView1, ArrayView2, Zip};

/// Cosine similarity of `query` against every row of `matrix` in one pass.
///
/// `row_norms[i]` must be the L2 norm of `matrix.row(i)`. Zero-norm rows, or a
/// zero-norm query, score 0.0. Results are clamped to [-1, 1] to absorb
/// rounding.
pub fn cosine_similarities(
    matrix: ArrayView2<'_, f32>,
    row_norms: ArrayView1<'_, f32>,
    query: ArrayView1<'_, f32>,
) -> Array1<f32> {
    let query_norm = query.dot(&query).sqrt();
    if query_norm == 0.0 {
        return Array1::zeros(matrix.nrows());
    }

    let dots = matrix.dot(&query);
    Zip::from(&dots)
        .and(&row_norms)
        .map_collect(|&dot, &norm| {
            if norm == 0.0 {
                0.0
            } else {
                (dot / (norm * query_norm)).clamp(-1.0, 1.0)
            }
        })
}
