use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::database::{AuditStore, Store};
use crate::error::Result;
use crate::models::audit_log::{AuditQuery, AuditRecord, NewAuditRecord};

/// Audit Writer.
///
/// `record` never waits for the insert: the write runs on a tracked task and
/// a failure is logged, not returned. `drain` waits for outstanding writes.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn Store>,
    tracker: TaskTracker,
}

impl AuditService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            tracker: TaskTracker::new(),
        }
    }

    pub fn record(&self, record: NewAuditRecord) {
        let store = self.store.clone();
        self.tracker.spawn(async move {
            let action = record.action.clone();
            let target_id = record.target_id;
            let actor_id = record.actor_id;
            match store.insert_audit(record).await {
                Ok(row) => tracing::debug!(audit_id = %row.id, %action, %target_id, "audit recorded"),
                Err(e) => tracing::error!(
                    error = ?e,
                    %action,
                    %actor_id,
                    %target_id,
                    "failed to write audit record"
                ),
            }
        });
    }

    pub fn log(
        &self,
        actor_id: Uuid,
        action: &str,
        target_type: &str,
        target_id: Uuid,
        payload: JsonValue,
    ) {
        self.record(NewAuditRecord {
            actor_id,
            action: action.to_string(),
            target_type: target_type.to_string(),
            target_id,
            payload,
        });
    }

    pub async fn query(&self, query: AuditQuery) -> Result<Vec<AuditRecord>> {
        self.store.query_audit(query).await
    }

    /// Waits until every write dispatched so far has finished.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn records_are_visible_after_drain_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let audit = AuditService::new(store.clone());
        let target = Uuid::new_v4();

        audit.log(Uuid::new_v4(), "BLOCK_USER", "user", target, json!({"reason": "spam"}));
        audit.drain().await;
        audit.log(Uuid::new_v4(), "UNBLOCK_USER", "user", target, json!({"reason": "appeal"}));
        audit.drain().await;

        let rows = audit
            .query(AuditQuery {
                target_id: Some(target),
                ..Default::default()
            })
            .await
            .unwrap();
        let actions: Vec<_> = rows.iter().map(|r| r.action.as_str()).collect();
        assert_eq!(actions, vec!["UNBLOCK_USER", "BLOCK_USER"]);
    }

    #[tokio::test]
    async fn failed_writes_are_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.fail_audit_writes(true);
        let audit = AuditService::new(store.clone());

        audit.log(Uuid::new_v4(), "BLOCK_ORG", "organization", Uuid::new_v4(), json!({}));
        audit.drain().await;

        assert!(audit.query(AuditQuery::default()).await.unwrap().is_empty());
    }
}
