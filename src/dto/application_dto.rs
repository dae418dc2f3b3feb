use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationFilter, Stage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationPayload {
    pub job_id: Uuid,
    pub resume_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdvanceStagePayload {
    #[validate(length(min = 1))]
    pub stage: String,
    #[validate(length(max = 1000))]
    pub decision: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub stage: Option<String>,
    pub job_id: Option<Uuid>,
}

impl ApplicationListQuery {
    pub fn into_filter(self) -> Result<ApplicationFilter> {
        let stage = self
            .stage
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.parse::<Stage>()
                    .map_err(|e| Error::BadRequest(e.to_string()))
            })
            .transpose()?;
        Ok(ApplicationFilter {
            stage,
            job_id: self.job_id,
        })
    }
}
