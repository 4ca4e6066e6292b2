use crate::config::BudgetConfig;
use crate::traversal::{Accumulator, Checkpoint};

/// Record-count limits for sampling runs.
///
/// When disabled the budget never trips, so a walk visits every reachable step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalBudget {
    enabled: bool,
    max_workflows: usize,
    max_jobs: usize,
    max_steps: usize,
}

impl TraversalBudget {
    /// Build from configuration; `debug` forces the budget on.
    pub fn from_config(config: &BudgetConfig, debug: bool) -> Self {
        Self {
            enabled: config.enabled || debug,
            max_workflows: config.max_workflows,
            max_jobs: config.max_jobs,
            max_steps: config.max_steps,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True once any accumulated count strictly exceeds its limit.
    pub fn exceeded(&self, accumulator: &Accumulator) -> bool {
        self.enabled
            && (accumulator.workflows() > self.max_workflows
                || accumulator.jobs() > self.max_jobs
                || accumulator.steps() > self.max_steps)
    }

    pub fn check(&self, accumulator: &Accumulator) -> Checkpoint {
        if self.exceeded(accumulator) {
            Checkpoint::Halt
        } else {
            Checkpoint::Continue
        }
    }
}
