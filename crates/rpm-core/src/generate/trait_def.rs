//! The `PlanGenerator` trait: the seam between the state machine and the
//! remote model.
//!
//! Object-safe, so callers can hold an `Arc<dyn PlanGenerator>` and tests can
//! swap in a stub.

use async_trait::async_trait;

use rpm_store::models::RpmPlan;

use super::GenerateError;

/// Turns the user's two free-text inputs into a plan.
///
/// One call is one round trip. Implementations must not retry and must not
/// touch local state; the caller decides what to do with the result.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Human-readable name for logs (e.g. the model id).
    fn name(&self) -> &str;

    async fn generate(&self, tasks: &str, goals: &str) -> Result<RpmPlan, GenerateError>;
}

// Compile-time assertion: PlanGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
