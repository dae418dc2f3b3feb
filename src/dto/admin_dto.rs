use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::audit_log::AuditQuery;
use crate::models::user::Role;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LifecyclePayload {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// `status` is `active` (default) or `blocked`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateListQuery {
    pub status: Option<String>,
    pub role: Option<String>,
}

impl StateListQuery {
    pub fn active(&self) -> Result<bool> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("active") => Ok(true),
            Some("blocked") => Ok(false),
            Some(other) => Err(Error::BadRequest(format!(
                "status must be active or blocked, got {}",
                other
            ))),
        }
    }

    pub fn role(&self) -> Result<Option<Role>> {
        self.role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(|r| r.parse().map_err(|e: crate::models::ParseEnumError| Error::BadRequest(e.to_string())))
            .transpose()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListQuery {
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    pub limit: Option<i64>,
}

impl From<AuditListQuery> for AuditQuery {
    fn from(q: AuditListQuery) -> Self {
        AuditQuery {
            target_type: q.target_type.filter(|t| !t.trim().is_empty()),
            target_id: q.target_id,
            limit: q.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_active() {
        let q = StateListQuery::default();
        assert!(q.active().unwrap());
        let q = StateListQuery {
            status: Some("blocked".into()),
            role: Some("Recruiter".into()),
        };
        assert!(!q.active().unwrap());
        assert_eq!(q.role().unwrap(), Some(Role::Recruiter));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let q = StateListQuery {
            status: Some("deleted".into()),
            role: None,
        };
        assert!(matches!(q.active(), Err(Error::BadRequest(_))));
    }
}
