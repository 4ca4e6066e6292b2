use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::duration_in_ms;
use crate::providers::github::types::{
    GitHubJob, GitHubJobRun, GitHubStep, GitHubWorkflow, GitHubWorkflowRun,
};

/// A workflow run together with its workflow identity and derived durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub workflow_id: u64,
    pub workflow_name: String,
    pub run_id: u64,
    pub head_branch: Option<String>,
    pub head_commit: Option<String>,
    pub head_commit_timestamp: Option<DateTime<Utc>>,
    pub commit: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "durationInMS")]
    pub duration_in_ms: Option<i64>,
    #[serde(rename = "queueDurationInMS")]
    pub queue_duration_in_ms: Option<i64>,
    #[serde(rename = "totalDurationInMS")]
    pub total_duration_in_ms: Option<i64>,
}

impl WorkflowRecord {
    pub fn new(
        workflow: &GitHubWorkflow,
        run: &GitHubWorkflowRun,
        run_duration_ms: Option<i64>,
    ) -> Self {
        let head_commit = run.head_commit.as_ref();

        Self {
            workflow_id: workflow.id,
            workflow_name: workflow.name.clone(),
            run_id: run.id,
            head_branch: run.head_branch.clone(),
            head_commit: head_commit.map(|commit| commit.id.clone()),
            head_commit_timestamp: head_commit.and_then(|commit| commit.timestamp),
            commit: run.head_sha.clone(),
            status: run.status.clone(),
            conclusion: run.conclusion.clone(),
            created_at: run.created_at,
            started_at: run.run_started_at,
            updated_at: run.updated_at,
            duration_in_ms: run_duration_ms,
            queue_duration_in_ms: duration_in_ms(Some(run.created_at), run.run_started_at),
            total_duration_in_ms: duration_in_ms(Some(run.created_at), Some(run.updated_at)),
        }
    }
}

/// A job of a workflow run, executed on one billable OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(flatten)]
    pub workflow: WorkflowRecord,
    pub os: String,
    pub job_id: u64,
    pub job_name: String,
    #[serde(rename = "jobDurationInMS")]
    pub job_duration_in_ms: Option<i64>,
    pub job_started_at: DateTime<Utc>,
    pub job_completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "jobWallDurationInMS")]
    pub job_wall_duration_in_ms: Option<i64>,
}

impl JobRecord {
    pub fn new(workflow: &WorkflowRecord, os: &str, summary: &GitHubJobRun, job: &GitHubJob) -> Self {
        Self {
            workflow: workflow.clone(),
            os: os.to_string(),
            job_id: summary.job_id,
            job_name: job.name.clone(),
            job_duration_in_ms: summary.duration_ms,
            job_started_at: job.started_at,
            job_completed_at: job.completed_at,
            job_wall_duration_in_ms: duration_in_ms(Some(job.started_at), job.completed_at),
        }
    }
}

/// A single step of a job. This is the unit of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(flatten)]
    pub job: JobRecord,
    pub step_name: String,
    pub step_number: u32,
    pub step_status: String,
    pub step_conclusion: Option<String>,
    pub step_started_at: Option<DateTime<Utc>>,
    pub step_completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "stepDurationInMS")]
    pub step_duration_in_ms: Option<i64>,
}

impl StepRecord {
    pub fn new(job: &JobRecord, step: &GitHubStep) -> Self {
        Self {
            job: job.clone(),
            step_name: step.name.clone(),
            step_number: step.number,
            step_status: step.status.clone(),
            step_conclusion: step.conclusion.clone(),
            step_started_at: step.started_at,
            step_completed_at: step.completed_at,
            step_duration_in_ms: duration_in_ms(step.started_at, step.completed_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::github::types::GitHubHeadCommit;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn create_workflow() -> GitHubWorkflow {
        GitHubWorkflow {
            id: 11,
            name: "CI".to_string(),
        }
    }

    fn create_run() -> GitHubWorkflowRun {
        GitHubWorkflowRun {
            id: 22,
            head_branch: Some("main".to_string()),
            head_sha: "deadbeef".to_string(),
            head_commit: Some(GitHubHeadCommit {
                id: "deadbeef".to_string(),
                timestamp: Some(ts("2024-03-01T09:59:00Z")),
            }),
            status: Some("completed".to_string()),
            conclusion: Some("success".to_string()),
            created_at: ts("2024-03-01T10:00:00Z"),
            updated_at: ts("2024-03-01T10:10:00Z"),
            run_started_at: Some(ts("2024-03-01T10:00:30Z")),
        }
    }

    fn create_job(steps: Vec<GitHubStep>) -> GitHubJob {
        GitHubJob {
            id: 33,
            name: "build".to_string(),
            started_at: ts("2024-03-01T10:01:00Z"),
            completed_at: Some(ts("2024-03-01T10:04:00Z")),
            steps: Some(steps),
        }
    }

    fn create_step(number: u32, started: Option<&str>, completed: Option<&str>) -> GitHubStep {
        GitHubStep {
            name: format!("step {number}"),
            status: "completed".to_string(),
            conclusion: Some("success".to_string()),
            number,
            started_at: started.map(ts),
            completed_at: completed.map(ts),
        }
    }

    #[test]
    fn test_workflow_record_derived_durations() {
        let record = WorkflowRecord::new(&create_workflow(), &create_run(), Some(540_000));

        assert_eq!(record.workflow_id, 11);
        assert_eq!(record.run_id, 22);
        assert_eq!(record.head_commit.as_deref(), Some("deadbeef"));
        assert_eq!(record.duration_in_ms, Some(540_000));
        assert_eq!(record.queue_duration_in_ms, Some(30_000));
        assert_eq!(record.total_duration_in_ms, Some(600_000));
    }

    #[test]
    fn test_workflow_record_without_head_commit_or_start() {
        let mut run = create_run();
        run.head_commit = None;
        run.run_started_at = None;

        let record = WorkflowRecord::new(&create_workflow(), &run, None);

        assert_eq!(record.head_commit, None);
        assert_eq!(record.head_commit_timestamp, None);
        assert_eq!(record.started_at, None);
        assert_eq!(record.queue_duration_in_ms, None);
        assert_eq!(record.total_duration_in_ms, Some(600_000));
    }

    #[test]
    fn test_job_record_inherits_workflow() {
        let workflow = WorkflowRecord::new(&create_workflow(), &create_run(), Some(1));
        let summary = GitHubJobRun {
            job_id: 33,
            duration_ms: Some(180_000),
        };

        let job = JobRecord::new(&workflow, "UBUNTU", &summary, &create_job(vec![]));

        assert_eq!(job.workflow, workflow);
        assert_eq!(job.os, "UBUNTU");
        assert_eq!(job.job_duration_in_ms, Some(180_000));
        assert_eq!(job.job_wall_duration_in_ms, Some(180_000));
    }

    #[test]
    fn test_job_record_still_running() {
        let workflow = WorkflowRecord::new(&create_workflow(), &create_run(), None);
        let summary = GitHubJobRun {
            job_id: 33,
            duration_ms: None,
        };
        let mut detail = create_job(vec![]);
        detail.completed_at = None;

        let job = JobRecord::new(&workflow, "UBUNTU", &summary, &detail);

        assert_eq!(job.job_completed_at, None);
        assert_eq!(job.job_wall_duration_in_ms, None);
    }

    #[test]
    fn test_step_record_serializes_flat() {
        let workflow = WorkflowRecord::new(&create_workflow(), &create_run(), Some(540_000));
        let summary = GitHubJobRun {
            job_id: 33,
            duration_ms: Some(180_000),
        };
        let step = create_step(1, Some("2024-03-01T10:01:00Z"), Some("2024-03-01T10:01:02Z"));
        let job = JobRecord::new(&workflow, "UBUNTU", &summary, &create_job(vec![step.clone()]));

        let value = serde_json::to_value(StepRecord::new(&job, &step)).unwrap();
        let object = value.as_object().unwrap();

        for field in [
            "workflowId",
            "workflowName",
            "runId",
            "headBranch",
            "headCommit",
            "headCommitTimestamp",
            "commit",
            "status",
            "conclusion",
            "createdAt",
            "startedAt",
            "updatedAt",
            "durationInMS",
            "queueDurationInMS",
            "totalDurationInMS",
            "os",
            "jobId",
            "jobName",
            "jobDurationInMS",
            "jobStartedAt",
            "jobCompletedAt",
            "jobWallDurationInMS",
            "stepName",
            "stepNumber",
            "stepStatus",
            "stepConclusion",
            "stepStartedAt",
            "stepCompletedAt",
            "stepDurationInMS",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert_eq!(object.len(), 29);
        assert_eq!(value["stepDurationInMS"], 2_000);
        assert_eq!(value["createdAt"], "2024-03-01T10:00:00Z");
        assert_eq!(value["os"], "UBUNTU");
    }

    #[test]
    fn test_step_record_nulls_are_serialized() {
        let mut run = create_run();
        run.head_commit = None;
        let workflow = WorkflowRecord::new(&create_workflow(), &run, None);
        let summary = GitHubJobRun {
            job_id: 33,
            duration_ms: None,
        };
        let step = create_step(2, None, None);
        let job = JobRecord::new(&workflow, "MACOS", &summary, &create_job(vec![]));

        let value = serde_json::to_value(StepRecord::new(&job, &step)).unwrap();

        assert!(value["headCommit"].is_null());
        assert!(value["durationInMS"].is_null());
        assert!(value["jobDurationInMS"].is_null());
        assert!(value["stepStartedAt"].is_null());
        assert!(value["stepDurationInMS"].is_null());
    }

    #[test]
    fn test_step_record_roundtrips_through_flat_json() {
        let workflow = WorkflowRecord::new(&create_workflow(), &create_run(), Some(5));
        let summary = GitHubJobRun {
            job_id: 33,
            duration_ms: Some(7),
        };
        let step = create_step(3, Some("2024-03-01T10:02:00Z"), None);
        let job = JobRecord::new(&workflow, "UBUNTU", &summary, &create_job(vec![]));
        let record = StepRecord::new(&job, &step);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: StepRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, record);
    }
}
