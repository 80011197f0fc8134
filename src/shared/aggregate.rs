//! Weighted progress roll-up.
//!
//! A parent's progress is the weightage-weighted mean of its subtasks'
//! progress, rounded half-to-even. Leaves are never touched: their progress
//! is whatever the user last entered.

use crate::shared::tasks::{Forest, TaskNode};

/// Weighted mean of `(progress, weight)` pairs, rounded half-to-even.
/// A zero total weight yields 0. Weights are scaled by the largest one so
/// huge weightages cannot overflow the sums.
pub fn weighted_progress<I>(children: I) -> u8
where
    I: IntoIterator<Item = (u8, f64)>,
{
    let children: Vec<(u8, f64)> = children.into_iter().collect();
    let max = children.iter().map(|(_, w)| *w).fold(0.0_f64, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return 0;
    }
    let (sum, total) = children
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sum, total), &(progress, weight)| {
            let weight = weight / max;
            (sum + f64::from(progress) * weight, total + weight)
        });
    if total > 0.0 {
        (sum / total).round_ties_even().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Recompute every parent's progress in place, bottom-up.
pub fn recalculate_progress(nodes: &mut [TaskNode]) {
    for node in nodes.iter_mut() {
        if node.is_leaf() {
            continue;
        }
        recalculate_progress(&mut node.subtasks);
        node.progress = weighted_progress(
            node.subtasks
                .iter()
                .map(|child| (child.progress, child.effective_weight())),
        );
    }
}

/// Pure form of [`recalculate_progress`]: returns a refreshed copy.
#[must_use]
pub fn recalculated(nodes: &[TaskNode]) -> Forest {
    let mut forest = nodes.to_vec();
    recalculate_progress(&mut forest);
    forest
}
