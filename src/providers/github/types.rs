use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

/// A workflow definition in a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflow {
    /// Unique identifier for the workflow
    pub id: u64,
    /// Name of the workflow
    pub name: String,
}

/// One execution of a workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflowRun {
    /// Unique identifier for the workflow run
    pub id: u64,
    /// Head branch or tag name
    pub head_branch: Option<String>,
    /// SHA of the head commit
    pub head_sha: String,
    /// Commit that triggered the run, absent for some event types
    pub head_commit: Option<GitHubHeadCommit>,
    /// Status of the run (queued, in_progress, completed, ...)
    pub status: Option<String>,
    /// Conclusion of the run (success, failure, ...)
    pub conclusion: Option<String>,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    /// When the run was last updated
    pub updated_at: DateTime<Utc>,
    /// When the current attempt started
    pub run_started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubHeadCommit {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Billing usage for a workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRunUsage {
    /// Billable job summaries keyed by OS label, in server order
    #[serde(default)]
    pub billable: IndexMap<String, GitHubBillableOs>,
    /// Total run duration reported by the server
    pub run_duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBillableOs {
    pub job_runs: Option<Vec<GitHubJobRun>>,
}

impl GitHubBillableOs {
    pub fn job_runs(&self) -> &[GitHubJobRun] {
        self.job_runs.as_deref().unwrap_or_default()
    }
}

/// Billable summary of a single job.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubJobRun {
    pub job_id: u64,
    pub duration_ms: Option<i64>,
}

/// Job within a GitHub Actions workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubJob {
    /// Unique identifier for the job
    pub id: u64,
    /// Name of the job
    pub name: String,
    /// When the job started
    pub started_at: DateTime<Utc>,
    /// When the job completed
    pub completed_at: Option<DateTime<Utc>>,
    /// Steps in this job
    pub steps: Option<Vec<GitHubStep>>,
}

impl GitHubJob {
    pub fn steps(&self) -> &[GitHubStep] {
        self.steps.as_deref().unwrap_or_default()
    }
}

/// Step within a GitHub Actions job.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubStep {
    /// Name of the step
    pub name: String,
    /// Status of the step
    pub status: String,
    /// Conclusion of the step
    pub conclusion: Option<String>,
    /// Step number
    pub number: u32,
    /// When the step started
    pub started_at: Option<DateTime<Utc>>,
    /// When the step completed
    pub completed_at: Option<DateTime<Utc>>,
}

/// A list endpoint's response body.
pub trait Page {
    type Item;

    fn into_items(self) -> Vec<Self::Item>;
}

/// Response from GitHub API for repository workflows.
#[derive(Deserialize)]
pub struct WorkflowsPage {
    workflows: Vec<GitHubWorkflow>,
}

impl Page for WorkflowsPage {
    type Item = GitHubWorkflow;

    fn into_items(self) -> Vec<GitHubWorkflow> {
        self.workflows
    }
}

/// Response from GitHub API for workflow runs.
#[derive(Deserialize)]
pub struct WorkflowRunsPage {
    workflow_runs: Vec<GitHubWorkflowRun>,
}

impl Page for WorkflowRunsPage {
    type Item = GitHubWorkflowRun;

    fn into_items(self) -> Vec<GitHubWorkflowRun> {
        self.workflow_runs
    }
}
