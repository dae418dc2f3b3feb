use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::blockable::{Blockable, BlockableKind};

/// An organization authenticates with its own credentials and has no role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl Blockable for Organization {
    const KIND: BlockableKind = BlockableKind::Organization;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn audit_details(&self) -> serde_json::Value {
        serde_json::json!({ "organization_name": self.name })
    }
}

/// Membership of a recruiter identity in exactly one organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrgUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub position: String,
    pub org_role: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrgUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub position: String,
    pub org_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecruiterView {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub position: String,
    pub org_role: String,
    pub email: String,
    pub mobile: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
