use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            "draft" => Ok(JobStatus::Draft),
            other => Err(ParseEnumError::new("job status", other)),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub location_type: String,
    pub employment_type: String,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub skills_required: Vec<String>,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Text handed to the fitment scorer.
    pub fn scoring_description(&self) -> String {
        let mut text = format!("{} ({}, {})", self.title, self.location_type, self.employment_type);
        if !self.skills_required.is_empty() {
            text.push_str("\nRequired skills: ");
            text.push_str(&self.skills_required.join(", "));
        }
        if let Some(desc) = &self.description {
            text.push_str("\n\n");
            text.push_str(desc);
        }
        text
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub organization_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub location_type: String,
    pub employment_type: String,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub skills_required: Vec<String>,
    pub description: Option<String>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub organization_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub organization_id: Option<Uuid>,
    pub status: Option<JobStatus>,
    /// Hide jobs whose organization is blocked.
    pub active_organizations_only: bool,
}
