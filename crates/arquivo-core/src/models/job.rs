use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs are terminal; they are kept only for status
    /// polling until the retention sweep removes them.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// An in-memory extraction job. Not persisted: a process restart loses all
/// job records and any pending work.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionJob {
    pub id: String,
    pub document_id: Uuid,
    pub storage_key: String,
    pub content_type: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl ExtractionJob {
    /// Job id format: document id plus the enqueue timestamp, so repeated
    /// reprocess requests for one document yield distinct ids.
    pub fn make_id(document_id: Uuid, enqueued_at: DateTime<Utc>) -> String {
        format!("{}-{}", document_id, enqueued_at.timestamp_millis())
    }

    pub fn new(document_id: Uuid, storage_key: String, content_type: String) -> Self {
        let now = Utc::now();
        ExtractionJob {
            id: Self::make_id(document_id, now),
            document_id,
            storage_key,
            content_type,
            status: JobStatus::Pending,
            created_at: now,
            completed_at: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobResponse {
    pub id: String,
    pub document_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ExtractionJob> for JobResponse {
    fn from(job: ExtractionJob) -> Self {
        Self {
            id: job.id,
            document_id: job.document_id,
            status: job.status,
            created_at: job.created_at,
            completed_at: job.completed_at,
            error: job.error,
        }
    }
}

/// Queue counts by status, for the status endpoint.
#[derive(Debug, Default, Serialize, PartialEq, Eq, ToSchema)]
pub struct QueueSummary {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}
