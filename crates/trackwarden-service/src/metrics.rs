//! Metrics collection for submission handling

use std::collections::HashMap;
use trackwarden_domain::{Classification, Outcome, Signal};

const OUTCOMES: [Outcome; 4] = [
    Outcome::Accepted,
    Outcome::QueuedForModeration,
    Outcome::RejectedInvalid,
    Outcome::RejectedSpam,
];

/// Metrics collected while deciding on and storing trackbacks
///
/// Tracks outcomes, triggered signals and persistence activity.
#[derive(Debug, Clone, Default)]
pub struct ServiceMetrics {
    /// Decisions per outcome
    pub outcomes: HashMap<Outcome, usize>,

    /// How often each signal fired
    pub signals: HashMap<Signal, usize>,

    /// Records written to the store
    pub persisted: usize,

    /// GUIDs regenerated after a store-side collision
    pub guid_collisions: usize,
}

impl ServiceMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision
    pub fn record_outcome(&mut self, outcome: Outcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Record the signals of one classification run
    pub fn record_signals(&mut self, classification: &Classification) {
        for triggered in &classification.signals {
            *self.signals.entry(triggered.signal).or_insert(0) += 1;
        }
    }

    /// Record a successful save
    pub fn record_persisted(&mut self) {
        self.persisted += 1;
    }

    /// Record a GUID collision
    pub fn record_collision(&mut self) {
        self.guid_collisions += 1;
    }

    /// Decisions with the given outcome
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get total decisions across all outcomes
    pub fn total_submissions(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get total triggered signals
    pub fn total_signals(&self) -> usize {
        self.signals.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.outcomes.clear();
        self.signals.clear();
        self.persisted = 0;
        self.guid_collisions = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Trackback Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Submissions: {}", self.total_submissions()),
            format!("Persisted: {}", self.persisted),
            format!("GUID collisions: {}", self.guid_collisions),
            String::new(),
        ];

        if !self.outcomes.is_empty() {
            lines.push("Outcomes:".to_string());
            for outcome in OUTCOMES {
                let count = self.count(outcome);
                if count > 0 {
                    lines.push(format!("  {}: {}", outcome.as_str(), count));
                }
            }
            lines.push(String::new());
        }

        if !self.signals.is_empty() {
            let mut signals: Vec<_> = self.signals.iter().collect();
            signals.sort();

            lines.push("Signals:".to_string());
            for (signal, count) in signals {
                lines.push(format!("  {}: {}", signal, count));
            }
            lines.push(format!("  Total: {}", self.total_signals()));
        }

        lines.join("\n")
    }
}
