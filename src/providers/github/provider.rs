use futures::{pin_mut, TryStreamExt};
use log::info;

use crate::auth::Token;
use crate::budget::TraversalBudget;
use crate::error::Result;
use crate::output::TraversalProgress;
use crate::records::WorkflowRecord;
use crate::traversal::{Accumulator, Checkpoint, TraversalEnd, TraversalReport};

use super::client::GitHubClient;
use super::pagination::paginate;
use super::types::{GitHubWorkflow, GitHubWorkflowRun, WorkflowRunsPage, WorkflowsPage};

/// Provider for collecting step telemetry from GitHub Actions.
pub struct GitHubProvider {
    /// GitHub API client
    client: GitHubClient,
}

impl GitHubProvider {
    /// Create a new GitHub Actions provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL
    /// * `owner` - Repository owner/organization
    /// * `repo` - Repository name
    /// * `token` - GitHub access token
    /// * `per_page` - Items requested per list page
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        owner: String,
        repo: String,
        token: Token,
        per_page: u8,
    ) -> Result<Self> {
        if owner.is_empty() || repo.is_empty() || owner.contains('/') || repo.contains('/') {
            return Err(crate::error::CiStepsError::Config(format!(
                "Repository must be given as separate owner and name, got '{owner}' '{repo}'"
            )));
        }

        let client = GitHubClient::new(base_url, owner, repo, token, per_page)?;
        Ok(Self { client })
    }

    /// Walk every workflow run on `branch` and flatten it into step records.
    ///
    /// Workflows are visited in server order, then their runs, then each run's
    /// billable jobs, then the steps of each job. The walk is strictly
    /// sequential: one request in flight at a time.
    ///
    /// This never returns an error directly. Failures end the walk and are
    /// reported as [`TraversalEnd::Failed`] so that the caller decides what to
    /// do with the records gathered so far.
    pub async fn collect_steps(&self, branch: &str, budget: &TraversalBudget) -> TraversalReport {
        info!(
            "Starting step collection for GitHub repository: {}/{} (branch: {branch})",
            self.client.owner(),
            self.client.repo()
        );
        if budget.is_enabled() {
            info!("Traversal budget enabled, output will be a sample");
        }

        let progress = TraversalProgress::start(branch);
        let mut walk = Walk {
            client: &self.client,
            budget,
            progress: &progress,
            accumulator: Accumulator::default(),
        };

        let end = match walk.workflows(branch).await {
            Ok(Checkpoint::Continue) => TraversalEnd::Completed,
            Ok(Checkpoint::Halt) => {
                info!("Traversal budget exceeded, stopping early");
                TraversalEnd::StoppedEarly
            }
            Err(err) => TraversalEnd::Failed(err),
        };

        let accumulator = walk.accumulator;
        progress.finish(&accumulator, &end);
        info!(
            "Visited {} workflow runs, {} jobs, {} steps",
            accumulator.workflows(),
            accumulator.jobs(),
            accumulator.steps()
        );

        TraversalReport::new(accumulator, end)
    }
}

/// State of one walk over the workflow hierarchy.
pub(super) struct Walk<'a> {
    pub(super) client: &'a GitHubClient,
    budget: &'a TraversalBudget,
    progress: &'a TraversalProgress,
    pub(super) accumulator: Accumulator,
}

impl Walk<'_> {
    /// Report progress and ask the budget whether to keep going.
    pub(super) fn checkpoint(&self) -> Checkpoint {
        self.progress.update(&self.accumulator);
        self.budget.check(&self.accumulator)
    }

    async fn workflows(&mut self, branch: &str) -> Result<Checkpoint> {
        let workflows = paginate::<WorkflowsPage>(self.client, self.client.workflows_url()?);
        pin_mut!(workflows);

        while let Some(workflow) = workflows.try_next().await? {
            info!("Fetching workflow {} ({})", workflow.id, workflow.name);

            if self.runs(&workflow, branch).await? == Checkpoint::Halt {
                return Ok(Checkpoint::Halt);
            }
        }

        Ok(Checkpoint::Continue)
    }

    async fn runs(&mut self, workflow: &GitHubWorkflow, branch: &str) -> Result<Checkpoint> {
        let url = self.client.workflow_runs_url(workflow.id, branch)?;
        let runs = paginate::<WorkflowRunsPage>(self.client, url);
        pin_mut!(runs);

        while let Some(run) = runs.try_next().await? {
            if self.run(workflow, &run).await? == Checkpoint::Halt {
                return Ok(Checkpoint::Halt);
            }
        }

        Ok(Checkpoint::Continue)
    }

    async fn run(&mut self, workflow: &GitHubWorkflow, run: &GitHubWorkflowRun) -> Result<Checkpoint> {
        info!("Fetching run {}", run.id);

        let usage = self.client.workflow_run_usage(run.id).await?;
        let record = WorkflowRecord::new(workflow, run, usage.run_duration_ms);

        self.accumulator.count_workflow();
        if self.checkpoint() == Checkpoint::Halt {
            return Ok(Checkpoint::Halt);
        }

        self.flatten_run(&record, &usage.billable).await
    }
}
