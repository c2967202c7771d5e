//! Shared fixtures for rpm integration tests.
//!
//! Provides sample plans (as models and as the JSON a model would answer
//! with) and a [`StubGenerator`] that replays canned results without any
//! network access.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use rpm_core::generate::{GenerateError, PlanGenerator};
use rpm_store::models::{Framework, ReasonItem, RpmCategory, RpmPlan};

/// Build a category whose reasons cycle through the six frameworks.
pub fn category(id: &str, name: &str, reason_ids: &[&str]) -> RpmCategory {
    RpmCategory {
        id: id.to_string(),
        name: name.to_string(),
        outcome: format!("{name} outcome"),
        purpose: format!("{name} purpose"),
        reasons: reason_ids
            .iter()
            .enumerate()
            .map(|(i, rid)| ReasonItem {
                id: rid.to_string(),
                description: format!("Reason {rid} for {name}"),
                framework: Framework::KNOWN[i % Framework::KNOWN.len()].clone(),
                is_brainstormed: true,
            })
            .collect(),
    }
}

/// Two categories (3 + 2 reasons) with a five-entry top list.
pub fn sample_plan() -> RpmPlan {
    RpmPlan {
        categories: vec![
            category("health", "Cosmic Health", &["h1", "h2", "h3"]),
            category("wealth", "Quantum Wealth", &["w1", "w2"]),
        ],
        daily_top5_ids: ["h1", "w2", "h3", "w1", "h2"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// `sample_plan()` encoded the way the model returns it.
pub fn sample_plan_json() -> String {
    serde_json::to_string(&sample_plan()).expect("sample plan serializes")
}

/// Wrap `text` in a `generateContent` response envelope.
pub fn gemini_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
}

/// A generator that pops canned results in order and counts calls.
///
/// Once the queue is empty every call fails with a generation error.
#[derive(Default)]
pub struct StubGenerator {
    results: Mutex<VecDeque<Result<RpmPlan, GenerateError>>>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(plan: RpmPlan) -> Self {
        let stub = Self::new();
        stub.push(Ok(plan));
        stub
    }

    pub fn failing(error: GenerateError) -> Self {
        let stub = Self::new();
        stub.push(Err(error));
        stub
    }

    pub fn push(&self, result: Result<RpmPlan, GenerateError>) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, _tasks: &str, _goals: &str) -> Result<RpmPlan, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(GenerateError::Generation("stub exhausted".to_string())))
    }
}
