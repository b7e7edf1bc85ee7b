//! Cost estimate for a conversation.
//!
//! Token counts are approximated at four characters per token; prices are
//! per 1K prompt tokens in US dollars.

use serde::{Deserialize, Serialize};

/// Estimated cost and token usage of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated cost in US dollars.
    pub cost: f64,
    /// Estimated token count.
    pub tokens: u64,
}

impl CostEstimate {
    /// Estimates the cost of sending `text` to `model`.
    pub fn for_text(text: &str, model: &str) -> Self {
        let tokens = estimate_tokens(text);
        let cost = tokens as f64 / 1000.0 * price_per_1k_tokens(model);
        Self { cost, tokens }
    }
}

/// Approximates the token count of `text` (~4 characters per token).
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    (chars + 3) / 4
}

/// Prompt price per 1K tokens for a model family.
pub fn price_per_1k_tokens(model: &str) -> f64 {
    match model {
        m if m.starts_with("gpt-4o-mini") => 0.000_15,
        m if m.starts_with("gpt-4o") => 0.002_5,
        m if m.starts_with("gpt-4-turbo")
            || m.starts_with("gpt-4-1106")
            || m.starts_with("gpt-4-0125") =>
        {
            0.01
        }
        m if m.starts_with("gpt-4") => 0.03,
        m if m.starts_with("gpt-3.5") => 0.000_5,
        _ => 0.01,
    }
}
