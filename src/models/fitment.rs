use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Latest score for a (candidate, job) pair; replaced on every re-score.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FitmentScore {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub score: i32,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitmentResult {
    pub score: i32,
    pub explanation: String,
}
