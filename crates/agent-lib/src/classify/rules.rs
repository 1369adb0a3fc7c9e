//! Log line scanning
//!
//! Scans a bounded window of recent log output for known failure
//! signatures. Rules are evaluated top to bottom per line and the first
//! match wins, so a line is classified exactly once even when several
//! keywords co-occur. Blank lines are skipped; a line matching no rule
//! produces nothing.

use crate::models::ErrorCandidate;
use regex::Regex;

/// Persisted error messages are truncated to this many characters.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Ordered failure signatures. `CrashLoopBackOff` must precede the generic
/// `Crash` rule. The `Error` rule matches only the literal `error:` form,
/// not bracketed level markers like `[ERROR]`.
const RULES: &[(&str, &str)] = &[
    (r"(?i)crashloopbackoff", "CrashLoopBackOff"),
    (r"(?i)oomkilled", "OOMKilled"),
    (r"(?i)error:", "Error"),
    (r"(?i)failed", "Failed"),
    (r"(?i)fatal", "Fatal"),
    (r"(?i)crash", "Crash"),
    (r"(?i)exception", "Exception"),
];

/// Extracts typed error candidates from raw log text
#[derive(Debug)]
pub struct LogErrorExtractor {
    rules: Vec<(Regex, &'static str)>,
}

impl LogErrorExtractor {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(pattern, error_type)| {
                // Patterns are compile-time literals; a failure here is a bug
                let re = Regex::new(pattern).expect("invalid built-in log rule");
                (re, *error_type)
            })
            .collect();
        Self { rules }
    }

    /// Scan log text line by line, producing one candidate per matching line.
    pub fn extract(&self, logs: &str) -> Vec<ErrorCandidate> {
        let mut candidates = Vec::new();

        for line in logs.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some((_, error_type)) =
                self.rules.iter().find(|(re, _)| re.is_match(line))
            {
                candidates.push(ErrorCandidate {
                    message: truncate(line),
                    error_type: (*error_type).to_string(),
                });
            }
        }

        candidates
    }
}

impl Default for LogErrorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(line: &str) -> String {
    line.chars().take(MAX_MESSAGE_LEN).collect()
}
