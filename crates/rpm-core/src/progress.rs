//! Derived statistics: internalization percent and the daily top 5.

use std::collections::HashMap;

use rpm_store::models::{CompletionState, ReasonItem, RpmCategory, RpmPlan};

/// Completed/total counts with a rounded percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `round(100 * completed / total)`, rounding halves up; `0` when
    /// `total` is zero.
    pub percent: u8,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percent: percent(completed, total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Integer round-half-up of `100 * completed / total`.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}

/// Progress over every reason in the plan.
pub fn plan_progress(plan: &RpmPlan, completion: &CompletionState) -> Progress {
    let total = plan.reason_count();
    let completed = plan
        .reasons()
        .filter(|(_, r)| completion.is_done(&r.id))
        .count();
    Progress::new(completed, total)
}

/// Progress scoped to one category.
pub fn category_progress(category: &RpmCategory, completion: &CompletionState) -> Progress {
    let completed = category
        .reasons
        .iter()
        .filter(|r| completion.is_done(&r.id))
        .count();
    Progress::new(completed, category.reasons.len())
}

/// One resolved entry of the daily top 5 panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopReason<'a> {
    pub reason: &'a ReasonItem,
    pub category_name: &'a str,
}

/// Resolve `daily_top5_ids` against the plan, in list order.
///
/// Ids that match no reason are dropped.
pub fn daily_top5(plan: &RpmPlan) -> Vec<TopReason<'_>> {
    let by_id: HashMap<&str, TopReason<'_>> = plan
        .reasons()
        .map(|(cat, reason)| {
            (
                reason.id.as_str(),
                TopReason {
                    reason,
                    category_name: cat.name.as_str(),
                },
            )
        })
        .collect();

    plan.daily_top5_ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect()
}
