//! The active/blocked capability shared by users and organizations.

use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockableKind {
    User,
    Organization,
}

impl BlockableKind {
    pub fn target_type(&self) -> &'static str {
        match self {
            BlockableKind::User => "user",
            BlockableKind::Organization => "organization",
        }
    }

    pub fn block_action(&self) -> &'static str {
        match self {
            BlockableKind::User => "BLOCK_USER",
            BlockableKind::Organization => "BLOCK_ORG",
        }
    }

    pub fn unblock_action(&self) -> &'static str {
        match self {
            BlockableKind::User => "UNBLOCK_USER",
            BlockableKind::Organization => "UNBLOCK_ORG",
        }
    }

    pub fn default_reason(&self, blocking: bool) -> String {
        let verb = if blocking { "blocked" } else { "unblocked" };
        format!("Admin {} {}", verb, self.target_type())
    }
}

/// An entity whose only lifecycle is a reversible active/blocked flag.
pub trait Blockable: Send + Sync + 'static {
    const KIND: BlockableKind;

    fn id(&self) -> Uuid;

    fn is_active(&self) -> bool;

    /// Protected entities can never be blocked.
    fn is_protected(&self) -> bool {
        false
    }

    /// Extra fields copied into the audit payload.
    fn audit_details(&self) -> JsonValue {
        JsonValue::Object(Default::default())
    }
}
