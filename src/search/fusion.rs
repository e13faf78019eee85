//! Rank fusion utilities: score normalization, weighted Reciprocal Rank
//! Fusion, weighted linear fusion and result de-duplication.

use crate::types::{RankedHit, Scored};
use std::collections::{HashMap, HashSet};
use tracing::warn;

pub use crate::config::DEFAULT_RRF_K as RRF_K;

/// Min-max scale scores into `[0, 1]`, preserving order.
///
/// When every score is equal (including single-element input) all entries
/// map to `1.0`. Infinite scores are clamped to the `f32` range and NaN
/// ranks lowest, so the output is always finite.
pub fn normalize_scores<T: Scored + Clone>(results: &[T]) -> Vec<T> {
    if results.is_empty() {
        return Vec::new();
    }

    let (min, max) = results
        .iter()
        .map(|r| clamped_score(r.score()))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));
    let range = max - min;

    results
        .iter()
        .cloned()
        .map(|mut result| {
            let normalized = if range > 0.0 {
                ((clamped_score(result.score()) - min) / range) as f32
            } else {
                1.0
            };
            result.set_score(normalized);
            result
        })
        .collect()
}

/// Widened to f64 so `max - min` cannot overflow
fn clamped_score(score: f32) -> f64 {
    if score.is_nan() {
        f32::MIN as f64
    } else {
        score.clamp(f32::MIN, f32::MAX) as f64
    }
}

/// Merge ranked lists with weighted Reciprocal Rank Fusion.
///
/// RRF Formula: `score(d) = sum_i w_i / (k + rank_i(d))`, with 1-based ranks.
/// An id missing from a list gets nothing from it. Without weights, or when
/// the weight count does not match the list count, every list gets `1 / N`.
///
/// Equal fused scores keep the order in which ids were first seen.
pub fn reciprocal_rank_fusion<L: AsRef<[RankedHit]>>(
    lists: &[L],
    weights: Option<&[f32]>,
    k: usize,
) -> Vec<RankedHit> {
    let weights = resolve_weights(lists.len(), weights);
    let k_param = k as f32;
    let mut acc = ScoreAccumulator::default();

    for (list, weight) in lists.iter().zip(&weights) {
        for (rank, hit) in list.as_ref().iter().enumerate() {
            let rank_position = (rank + 1) as f32;
            acc.add(&hit.id, weight / (k_param + rank_position));
        }
    }

    acc.into_ranked()
}

/// Merge ranked lists by summing weighted min-max normalized scores.
///
/// Each list is normalized on its own first so lists on different score
/// scales become comparable. Weights resolve the same way as for
/// [`reciprocal_rank_fusion`].
pub fn linear_fusion<L: AsRef<[RankedHit]>>(
    lists: &[L],
    weights: Option<&[f32]>,
) -> Vec<RankedHit> {
    let weights = resolve_weights(lists.len(), weights);
    let mut acc = ScoreAccumulator::default();

    for (list, weight) in lists.iter().zip(&weights) {
        let normalized = normalize_scores(list.as_ref());
        let mut seen = HashSet::new();
        for hit in &normalized {
            // Only the best-ranked occurrence of an id counts within one list
            if seen.insert(hit.id.as_str()) {
                acc.add(&hit.id, weight * hit.score);
            }
        }
    }

    acc.into_ranked()
}

/// Collapse repeated ids, keeping the highest-scoring entry of each.
///
/// Ties keep the first occurrence. Output follows the order in which ids
/// first appear in the input.
pub fn deduplicate_results<T: Scored>(results: Vec<T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(results.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in results {
        match positions.get(result.id()) {
            Some(&pos) => {
                if result.score() > kept[pos].score() {
                    kept[pos] = result;
                }
            }
            None => {
                positions.insert(result.id().to_string(), kept.len());
                kept.push(result);
            }
        }
    }

    kept
}

fn resolve_weights(list_count: usize, weights: Option<&[f32]>) -> Vec<f32> {
    let uniform = || vec![1.0 / list_count as f32; list_count];
    match weights {
        None => uniform(),
        Some(w) if w.len() == list_count => w.to_vec(),
        Some(w) => {
            warn!(
                "[FUSION] Got {} weights for {} lists, falling back to uniform weighting",
                w.len(),
                list_count
            );
            uniform()
        }
    }
}

/// Sums per-id contributions while remembering first-seen order.
#[derive(Default)]
struct ScoreAccumulator {
    entries: Vec<RankedHit>,
    positions: HashMap<String, usize>,
}

impl ScoreAccumulator {
    fn add(&mut self, id: &str, amount: f32) {
        match self.positions.get(id) {
            Some(&pos) => self.entries[pos].score += amount,
            None => {
                self.positions.insert(id.to_string(), self.entries.len());
                self.entries.push(RankedHit::new(id, amount));
            }
        }
    }

    fn into_ranked(mut self) -> Vec<RankedHit> {
        // Stable sort keeps first-seen order among equal scores
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.entries
    }
}
