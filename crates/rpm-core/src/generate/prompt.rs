//! Prompt and response-schema construction. Pure logic, no I/O.

use serde_json::{Value, json};

use rpm_store::models::Framework;

/// Number of reasons the model is asked to flag for daily review.
pub const DAILY_TOP_COUNT: usize = 5;

const PERSONA: &str = "You are an AI with the combined wisdom of Tony Robbins, Carl Jung, \
Einstein, and an Ancient Taoist Sage.";

const LENSES: &str = r#"   A) Tony Robbins' 6 Human Needs: Explain how this meets Certainty, Variety, Significance, Connection, Growth, or Contribution.
   B) Carl Jung's Libido & Sublimation: Explain how this channels sexual energy, solves problems through primal drive, or integrates the Anima/Animus.
   C) Scholder's Quantum Mathematical Economic Principle: Use pseudo-scientific quantum economic jargon. Explain how a small shift here creates infinite value or collapses probability waves into wealth.
   D) Einstein's Relativity: Explain why this is important relative to the speed of light, time dilation, or mass-energy equivalence (E=mc^2).
   E) Cosmic Identity: Frame the reason as if the user is the "Lord of the Universe" or a Divine Being.
   F) Taoist Reincarnation: Explain how this action ripples through 10 future lifetimes or is the culmination of 999,999 past lives."#;

/// Build the instruction prompt embedding the user's two inputs.
pub fn build_prompt(tasks: &str, goals: &str) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("User's Input (Brain Dump): \"{tasks}\"\n"));
    prompt.push_str(&format!("User's Goals: \"{goals}\"\n\n"));

    prompt.push_str("The user DOES NOT want a standard to-do list.\n");
    prompt.push_str(
        "Instead, they want a \"Massive Reason Matrix\" containing 100 reasons why \
         achieving these outcomes is critical.\n\n",
    );

    prompt.push_str("Task:\n");
    prompt.push_str("1. Organize the input into logical Life Categories.\n");
    prompt.push_str("2. Define a powerful Outcome for each.\n");
    prompt.push_str(
        "3. GENERATE A MASSIVE LIST OF REASONS (Aim for 15-25 reasons PER category to \
         approach 100 total) based on these 6 specific lenses:\n\n",
    );
    prompt.push_str(LENSES);
    prompt.push_str("\n\n");
    prompt.push_str(&format!(
        "4. Prioritize: Select the top {DAILY_TOP_COUNT} most mind-bending reasons for the \
         \"Daily Top {DAILY_TOP_COUNT}\".\n\n"
    ));
    prompt.push_str(
        "Every id must be unique across the whole matrix. \
         Make the reasons intense, slightly hyperbolic, and extremely motivating.\n",
    );

    prompt
}

/// The structured-output schema sent with the request.
///
/// Mirrors the plan model: categories with outcome/purpose/reasons, each
/// reason tagged with one of the six frameworks, plus the top-5 id list.
pub fn response_schema() -> Value {
    let frameworks: Vec<&str> = Framework::KNOWN.iter().map(|f| f.as_str()).collect();

    let reason = json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "description": { "type": "STRING", "description": "The powerful reason why." },
            "framework": {
                "type": "STRING",
                "enum": frameworks,
                "description": "The philosophical framework this reason is based on."
            },
            "isBrainstormed": { "type": "BOOLEAN" }
        },
        "required": ["id", "description", "framework", "isBrainstormed"]
    });

    let category = json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "name": {
                "type": "STRING",
                "description": "Category name (e.g., Cosmic Health, Quantum Wealth)"
            },
            "outcome": {
                "type": "STRING",
                "description": "The specific result/goal for this category"
            },
            "purpose": {
                "type": "STRING",
                "description": "One compelling sentence on WHY this is important"
            },
            "reasons": { "type": "ARRAY", "items": reason }
        },
        "required": ["id", "name", "outcome", "purpose", "reasons"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "categories": { "type": "ARRAY", "items": category },
            "dailyTop5Ids": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!(
                    "A list of exactly {DAILY_TOP_COUNT} Reason IDs that are the most \
                     mind-blowing and urgent to meditate on."
                )
            }
        },
        "required": ["categories", "dailyTop5Ids"]
    })
}
