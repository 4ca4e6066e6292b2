use indexmap::IndexMap;
use log::debug;

use crate::error::Result;
use crate::records::{JobRecord, StepRecord, WorkflowRecord};
use crate::traversal::Checkpoint;

use super::provider::Walk;
use super::types::GitHubBillableOs;

impl Walk<'_> {
    /// Expand a run's billable breakdown into job and step records.
    ///
    /// OS buckets are visited in the order the server listed them, jobs in
    /// `job_runs` order and steps in API order. Each job costs one request for
    /// its details. Every job and step yields exactly one record unless the
    /// budget halts the walk.
    pub(super) async fn flatten_run(
        &mut self,
        workflow: &WorkflowRecord,
        billable: &IndexMap<String, GitHubBillableOs>,
    ) -> Result<Checkpoint> {
        for (os, usage) in billable {
            for summary in usage.job_runs() {
                debug!("Fetching job {} ({os})", summary.job_id);
                let detail = self.client.job(summary.job_id).await?;

                let job = JobRecord::new(workflow, os, summary, &detail);
                self.accumulator.count_job();
                if self.checkpoint() == Checkpoint::Halt {
                    return Ok(Checkpoint::Halt);
                }

                for step in detail.steps() {
                    self.accumulator.push_step(StepRecord::new(&job, step));
                    if self.checkpoint() == Checkpoint::Halt {
                        return Ok(Checkpoint::Halt);
                    }
                }
            }
        }

        Ok(Checkpoint::Continue)
    }
}
