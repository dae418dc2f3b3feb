use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::models::job::JobStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_experience_range"))]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub location_type: String,
    #[validate(length(min = 1, max = 50))]
    pub employment_type: String,
    #[validate(range(min = 0, max = 60))]
    pub experience_min: Option<i32>,
    #[validate(range(min = 0, max = 60))]
    pub experience_max: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_skills"))]
    pub skills_required: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

fn validate_experience_range(payload: &CreateJobPayload) -> std::result::Result<(), ValidationError> {
    match (payload.experience_min, payload.experience_max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("experience_range")),
        _ => Ok(()),
    }
}

impl CreateJobPayload {
    /// New jobs open unless created as drafts.
    pub fn initial_status(&self) -> Result<JobStatus> {
        let status = parse_status(self.status.as_deref())?.unwrap_or(JobStatus::Open);
        if status == JobStatus::Closed {
            return Err(Error::BadRequest("a job cannot be created closed".into()));
        }
        Ok(status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

impl JobListQuery {
    pub fn status(&self) -> Result<Option<JobStatus>> {
        parse_status(self.status.as_deref())
    }
}

pub fn parse_status(raw: Option<&str>) -> Result<Option<JobStatus>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse()
                .map_err(|e: crate::models::ParseEnumError| Error::BadRequest(e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status: Option<&str>) -> CreateJobPayload {
        CreateJobPayload {
            title: "Engineer".into(),
            location_type: "remote".into(),
            employment_type: "full-time".into(),
            experience_min: Some(5),
            experience_max: Some(2),
            skills_required: vec![],
            description: None,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn inverted_experience_range_fails_validation() {
        assert!(payload(None).validate().is_err());
    }

    #[test]
    fn initial_status_defaults_to_open() {
        assert_eq!(payload(None).initial_status().unwrap(), JobStatus::Open);
        assert_eq!(payload(Some("draft")).initial_status().unwrap(), JobStatus::Draft);
        assert!(payload(Some("closed")).initial_status().is_err());
        assert!(payload(Some("archived")).initial_status().is_err());
    }
}
