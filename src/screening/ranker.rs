//! Ranking of scored results

use std::cmp::Ordering;

use super::ScreeningCandidate;

/// Anything carrying a composite score
pub trait Ranked {
    fn score(&self) -> f64;
}

impl Ranked for ScreeningCandidate {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Sort by score descending and keep the first `top_n`
///
/// Non-finite scores are dropped. The sort is stable, so equal scores keep
/// their discovery order.
pub fn rank<T: Ranked>(mut items: Vec<T>, top_n: usize) -> Vec<T> {
    items.retain(|item| item.score().is_finite());
    items.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
    items.truncate(top_n);
    items
}
