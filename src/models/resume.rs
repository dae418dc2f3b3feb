use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub storage_path: String,
    pub version_label: String,
    pub source: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub candidate_id: Uuid,
    pub storage_path: String,
    /// `None` lets the store assign the next `vN` for the candidate.
    pub version_label: Option<String>,
    pub source: String,
}
