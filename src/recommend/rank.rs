use crate::catalog::JobRecord;
use std::collections::HashSet;

/// Order catalog rows by score and shape the top of the list.
///
/// Returns `(row, score)` pairs: stable descending sort, first occurrence of
/// each (title, company) kept, scores below `threshold` dropped, at most
/// `top_k` entries. `jobs` and `scores` are row-aligned.
pub fn rank_rows(
    jobs: &[JobRecord],
    scores: &[f32],
    top_k: usize,
    threshold: f32,
) -> Vec<(usize, f32)> {
    debug_assert_eq!(jobs.len(), scores.len());

    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable: equal scores keep catalog order.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut out = Vec::with_capacity(top_k.min(order.len()));
    for row in order {
        if out.len() >= top_k {
            break;
        }
        let job = &jobs[row];
        if !seen.insert((job.title.as_str(), job.company.as_str())) {
            continue;
        }
        let score = scores[row];
        // Also drops NaN.
        if !(score >= threshold) {
            continue;
        }
        out.push((row, score));
    }
    out
}
