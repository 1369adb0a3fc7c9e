//! Severity assignment
//!
//! Case-insensitive keyword scan over the error message, first match wins.
//! This is advisory triage input, not a control signal: an unrelated use of
//! a keyword can misclassify a line, and that is acceptable.

use crate::models::Priority;

/// Tokens implying total failure
const P0_TOKENS: &[&str] = &["p0", "critical", "fatal", "corruption"];

/// Tokens implying a scoped but serious failure
const P1_TOKENS: &[&str] = &["p1", "error:", "image"];

/// Assign a severity tier from message content. Defaults to P2; P3 is only
/// ever assigned manually.
pub fn classify_priority(message: &str) -> Priority {
    let message = message.to_lowercase();

    if P0_TOKENS.iter().any(|t| message.contains(t)) {
        Priority::P0
    } else if P1_TOKENS.iter().any(|t| message.contains(t)) {
        Priority::P1
    } else {
        Priority::P2
    }
}
