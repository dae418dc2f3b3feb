use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use super::audit_service::AuditService;
use crate::database::{BlockableStore, Store};
use crate::error::{Error, Result};
use crate::models::audit_log::NewAuditRecord;
use crate::models::blockable::Blockable;
use crate::models::user::{Role, User};

/// Lifecycle Manager: block and unblock over any [`Blockable`] entity.
///
/// A target that is missing, already in the requested state, or protected
/// yields `NotFound`. The write is conditional on the current state, so of
/// two racing calls exactly one succeeds and only that one is audited.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn Store>,
    audit: AuditService,
}

impl LifecycleService {
    pub fn new(store: Arc<dyn Store>, audit: AuditService) -> Self {
        Self { store, audit }
    }

    pub async fn block<T>(&self, actor_id: Uuid, target_id: Uuid, reason: Option<String>) -> Result<T>
    where
        T: Blockable,
        dyn Store: BlockableStore<T>,
    {
        self.transition::<T>(actor_id, target_id, true, reason).await
    }

    pub async fn unblock<T>(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        reason: Option<String>,
    ) -> Result<T>
    where
        T: Blockable,
        dyn Store: BlockableStore<T>,
    {
        self.transition::<T>(actor_id, target_id, false, reason).await
    }

    /// Active or blocked entities; protected ones are never listed.
    pub async fn list<T>(&self, active: bool) -> Result<Vec<T>>
    where
        T: Blockable,
        dyn Store: BlockableStore<T>,
    {
        let rows = BlockableStore::<T>::list_by_state(self.store.as_ref(), active).await?;
        Ok(rows.into_iter().filter(|e| !e.is_protected()).collect())
    }

    pub async fn list_users(&self, active: bool, role: Option<Role>) -> Result<Vec<User>> {
        let users = self.list::<User>(active).await?;
        Ok(users
            .into_iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .collect())
    }

    async fn transition<T>(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        blocking: bool,
        reason: Option<String>,
    ) -> Result<T>
    where
        T: Blockable,
        dyn Store: BlockableStore<T>,
    {
        let store = self.store.as_ref();
        // Blocking needs an active target, unblocking a blocked one.
        let from = blocking;
        let to = !blocking;
        let not_found = || {
            let state = if from { "active" } else { "blocked" };
            Error::NotFound(format!("No {} {} with id {}", state, T::KIND.target_type(), target_id))
        };

        let target = BlockableStore::<T>::find_blockable(store, target_id)
            .await?
            .ok_or_else(not_found)?;
        if target.is_active() != from || target.is_protected() {
            return Err(not_found());
        }

        if !BlockableStore::<T>::transition_active(store, target_id, from, to).await? {
            tracing::info!(%actor_id, %target_id, blocking, "lifecycle transition lost a race");
            return Err(not_found());
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| T::KIND.default_reason(blocking));
        let action = if blocking {
            T::KIND.block_action()
        } else {
            T::KIND.unblock_action()
        };
        self.audit.record(NewAuditRecord {
            actor_id,
            action: action.to_string(),
            target_type: T::KIND.target_type().to_string(),
            target_id,
            payload: audit_payload(target.audit_details(), &reason),
        });
        tracing::info!(%actor_id, %target_id, action, "lifecycle transition applied");

        BlockableStore::<T>::find_blockable(store, target_id)
            .await?
            .ok_or_else(not_found)
    }
}

fn audit_payload(details: JsonValue, reason: &str) -> JsonValue {
    let mut payload = match details {
        JsonValue::Object(map) => map,
        _ => Default::default(),
    };
    payload.insert("reason".to_string(), json!(reason));
    JsonValue::Object(payload)
}
