use crate::types::HealthStatus;

// ---------------------------------------------------------------------------
// HealthSignals (input)
// ---------------------------------------------------------------------------

/// Aggregated signals for one project's processing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSignals {
    /// Count of distinct blockers across all analyzed batches.
    pub blocker_count: usize,
    /// Mean sentiment score across analyzed batches, in [0, 1].
    pub sentiment: f64,
    /// Count of warning signs considered for classification (capped upstream).
    pub warning_sign_count: usize,
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A fn-pointer rule — zero-cost, no heap allocation.
pub struct Rule {
    pub id: &'static str,
    pub condition: fn(&HealthSignals) -> bool,
    pub status: HealthStatus,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Ordered rule evaluation, first match wins. The rules are not mutually
/// exclusive by construction, so their order is the tie-break: a project
/// with three blockers and sentiment 0.9 is Critical, not Healthy.
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, signals: &HealthSignals) -> HealthStatus {
        for rule in &self.rules {
            if (rule.condition)(signals) {
                return rule.status;
            }
        }
        HealthStatus::Unknown
    }
}

// ---------------------------------------------------------------------------
// Default rules
// ---------------------------------------------------------------------------

/// The production rule table. Thresholds are product decisions carried over
/// verbatim; do not re-derive them.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "critical",
            condition: |s| s.blocker_count >= 3 || s.sentiment < 0.3,
            status: HealthStatus::Critical,
        },
        Rule {
            id: "at-risk",
            condition: |s| s.blocker_count >= 1 || s.sentiment < 0.5 || s.warning_sign_count >= 2,
            status: HealthStatus::AtRisk,
        },
        Rule {
            id: "healthy",
            condition: |s| s.sentiment >= 0.6,
            status: HealthStatus::Healthy,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
