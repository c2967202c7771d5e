//! Boundary validator for the model's JSON answer.
//!
//! The remote service is asked to honour a schema, but its output is still
//! checked here:
//! - The text must decode into the plan shape.
//! - Category ids and reason ids must be non-empty.
//! - Reason ids must be unique across the whole plan, since completion and
//!   the top-5 list index by reason id alone.
//!
//! Frameworks outside the known six and a top-5 list of the wrong length are
//! tolerated; they only affect rendering.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use rpm_store::models::RpmPlan;

use super::prompt::DAILY_TOP_COUNT;

/// Errors from decoding and validating a generated plan.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("response is not a valid plan document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("category {category:?} has a reason with an empty id")]
    EmptyReasonId { category: String },

    #[error("category {name:?} has an empty id")]
    EmptyCategoryId { name: String },

    #[error("duplicate reason id: {0:?}")]
    DuplicateReasonId(String),
}

/// Decode and validate the response text.
pub fn parse_plan_json(text: &str) -> Result<RpmPlan, PlanParseError> {
    let plan: RpmPlan = serde_json::from_str(text)?;
    validate(&plan)?;
    Ok(plan)
}

fn validate(plan: &RpmPlan) -> Result<(), PlanParseError> {
    let mut seen = HashSet::new();
    for category in &plan.categories {
        if category.id.trim().is_empty() {
            return Err(PlanParseError::EmptyCategoryId {
                name: category.name.clone(),
            });
        }
        for reason in &category.reasons {
            if reason.id.trim().is_empty() {
                return Err(PlanParseError::EmptyReasonId {
                    category: category.name.clone(),
                });
            }
            if !seen.insert(reason.id.as_str()) {
                return Err(PlanParseError::DuplicateReasonId(reason.id.clone()));
            }
        }
    }

    if plan.daily_top5_ids.len() != DAILY_TOP_COUNT {
        warn!(
            count = plan.daily_top5_ids.len(),
            expected = DAILY_TOP_COUNT,
            "daily top list has unexpected length"
        );
    }
    let unresolved = plan
        .daily_top5_ids
        .iter()
        .filter(|id| !seen.contains(id.as_str()))
        .count();
    if unresolved > 0 {
        warn!(unresolved, "daily top list references unknown reason ids");
    }

    let unknown_frameworks = plan
        .reasons()
        .filter(|(_, r)| !r.framework.is_known())
        .count();
    if unknown_frameworks > 0 {
        warn!(count = unknown_frameworks, "reasons tagged with unknown frameworks");
    }

    Ok(())
}
