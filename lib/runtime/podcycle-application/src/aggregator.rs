use podcycle_domain::{CycleSummary, RestartOutcome};

/// Append-only record of restart outcomes, in candidate order.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLedger {
    outcomes: Vec<RestartOutcome>,
}

impl OutcomeLedger {
    pub fn record(&mut self, outcome: RestartOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[RestartOutcome] {
        &self.outcomes
    }

    pub fn summarize(&self) -> CycleSummary {
        CycleSummary::from_outcomes(&self.outcomes)
    }

    pub fn into_outcomes(self) -> Vec<RestartOutcome> {
        self.outcomes
    }
}
