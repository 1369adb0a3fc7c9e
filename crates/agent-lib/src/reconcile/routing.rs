//! AI-status seeding rules
//!
//! A data-driven routing table mapping `(pod name pattern, message keyword)`
//! pairs to the initial AI-resolution status of a newly persisted error.
//! Evaluated top to bottom, first match wins; no match seeds `not_started`.

use crate::models::AiResolutionStatus;
use regex::Regex;

/// One routing rule
#[derive(Debug)]
pub struct RoutingRule {
    pod_pattern: Regex,
    message_keyword: String,
    status: AiResolutionStatus,
}

/// Ordered set of AI-status seeding rules
#[derive(Debug, Default)]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
}

impl RoutingTable {
    /// Empty table: every new error starts `not_started`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock rules: dashboard-role pods with image errors and
    /// postgres-role pods with corruption errors are handed to the
    /// remediation pipeline immediately.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule("^dashboard$", "image", AiResolutionStatus::Analyzing)
            .with_rule("^postgres$", "corruption", AiResolutionStatus::Analyzing)
    }

    /// Append a rule. The pod pattern is a regex matched against the pod
    /// name; the keyword is a case-insensitive substring of the message.
    pub fn with_rule(
        mut self,
        pod_pattern: &str,
        message_keyword: &str,
        status: AiResolutionStatus,
    ) -> Self {
        // Rule tables are built at startup from literals or validated config
        let pod_pattern = Regex::new(pod_pattern).expect("invalid routing rule pattern");
        self.rules.push(RoutingRule {
            pod_pattern,
            message_keyword: message_keyword.to_lowercase(),
            status,
        });
        self
    }

    /// Initial AI-resolution status for a new error.
    pub fn initial_status(&self, pod_name: &str, message: &str) -> AiResolutionStatus {
        let message = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| {
                rule.pod_pattern.is_match(pod_name) && message.contains(&rule.message_keyword)
            })
            .map(|rule| rule.status)
            .unwrap_or_default()
    }
}
