//! Group ranking.

use crate::models::FailureGroup;

/// Orders groups and keeps the top `max_groups`.
///
/// Any group with a recent failure ranks above every group without one;
/// within each tier, larger groups come first. The sort is stable, so groups
/// with equal keys keep their encounter order.
#[must_use]
pub fn rank(mut groups: Vec<FailureGroup>, max_groups: usize) -> Vec<FailureGroup> {
    groups.sort_by(|a, b| (b.has_recent(), b.count).cmp(&(a.has_recent(), a.count)));
    groups.truncate(max_groups);
    groups
}
