use crate::error::CiStepsError;
use crate::records::StepRecord;

/// What the walk should do after a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Continue,
    Halt,
}

/// Records gathered so far during a walk.
///
/// Workflow runs and jobs only carry inherited fields into their step records,
/// so only their counts are tracked.
#[derive(Debug, Default)]
pub struct Accumulator {
    workflows: usize,
    jobs: usize,
    steps: Vec<StepRecord>,
}

impl Accumulator {
    pub fn count_workflow(&mut self) {
        self.workflows += 1;
    }

    pub fn count_job(&mut self) {
        self.jobs += 1;
    }

    pub fn push_step(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn workflows(&self) -> usize {
        self.workflows
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn steps(&self) -> usize {
        self.steps.len()
    }

    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }
}

/// How a walk ended.
#[derive(Debug)]
pub enum TraversalEnd {
    /// Every reachable step was visited.
    Completed,
    /// The budget tripped; output is a sample.
    StoppedEarly,
    /// A collaborator failed; accumulated output is incomplete.
    Failed(CiStepsError),
}

/// Result of a full walk, whichever way it ended.
#[derive(Debug)]
pub struct TraversalReport {
    pub workflows: usize,
    pub jobs: usize,
    pub steps: Vec<StepRecord>,
    pub end: TraversalEnd,
}

impl TraversalReport {
    pub fn new(accumulator: Accumulator, end: TraversalEnd) -> Self {
        Self {
            workflows: accumulator.workflows(),
            jobs: accumulator.jobs(),
            steps: accumulator.into_steps(),
            end,
        }
    }

    /// Steps that may be written, or the error that prevented a complete walk.
    ///
    /// Output from a failed walk is dropped.
    pub fn into_output(self) -> crate::error::Result<Vec<StepRecord>> {
        match self.end {
            TraversalEnd::Completed | TraversalEnd::StoppedEarly => Ok(self.steps),
            TraversalEnd::Failed(err) => {
                if !self.steps.is_empty() {
                    log::warn!(
                        "Discarding {} step records collected before the failure",
                        self.steps.len()
                    );
                }
                Err(err)
            }
        }
    }
}
