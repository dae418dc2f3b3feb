use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// Position of an application in its hiring pipeline.
///
/// Forward order is `applied → shortlisted → interview → offer → hired`.
/// `rejected` is reachable from every non-terminal stage. `hired` and
/// `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Shortlisted,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Shortlisted,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Shortlisted => "shortlisted",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Hired | Stage::Rejected)
    }

    /// Stages legally reachable in one step.
    pub fn successors(&self) -> &'static [Stage] {
        match self {
            Stage::Applied => &[Stage::Shortlisted, Stage::Rejected],
            Stage::Shortlisted => &[Stage::Interview, Stage::Rejected],
            Stage::Interview => &[Stage::Offer, Stage::Rejected],
            Stage::Offer => &[Stage::Hired, Stage::Rejected],
            Stage::Hired | Stage::Rejected => &[],
        }
    }

    pub fn can_advance_to(&self, next: Stage) -> bool {
        self.successors().contains(&next)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("stage", wanted))
    }
}

impl TryFrom<String> for Stage {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How strictly stage updates follow the transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StagePolicy {
    /// Only edges of the transition graph are accepted.
    #[default]
    Strict,
    /// Any stage of the vocabulary is accepted regardless of the current one.
    Permissive,
}

impl StagePolicy {
    pub fn permits(&self, from: Stage, to: Stage) -> bool {
        match self {
            StagePolicy::Strict => from.can_advance_to(to),
            StagePolicy::Permissive => true,
        }
    }
}

impl FromStr for StagePolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(StagePolicy::Strict),
            "permissive" => Ok(StagePolicy::Permissive),
            other => Err(ParseEnumError::new("stage policy", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_id: Uuid,
    #[sqlx(try_from = "String")]
    pub stage: Stage,
    pub decision: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct StageUpdate {
    pub application_id: Uuid,
    pub expected: Stage,
    pub next: Stage,
    pub decision: Option<String>,
    pub actor_id: Uuid,
}

/// Application joined with job, organization, candidate, resume and fitment data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_id: Uuid,
    #[sqlx(try_from = "String")]
    pub stage: Stage,
    pub decision: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub job_title: String,
    pub job_status: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub candidate_email: String,
    pub candidate_name: Option<String>,
    pub resume_path: Option<String>,
    pub resume_label: Option<String>,
    pub fitment_score: Option<i32>,
    pub fitment_explanation: Option<String>,
}

/// Whose applications a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    Candidate(Uuid),
    Organization(Uuid),
    Platform,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub stage: Option<Stage>,
    pub job_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_and_rejection_are_the_only_edges() {
        assert!(Stage::Applied.can_advance_to(Stage::Shortlisted));
        assert!(Stage::Shortlisted.can_advance_to(Stage::Interview));
        assert!(Stage::Interview.can_advance_to(Stage::Offer));
        assert!(Stage::Offer.can_advance_to(Stage::Hired));
        assert!(!Stage::Applied.can_advance_to(Stage::Interview));
        assert!(!Stage::Applied.can_advance_to(Stage::Hired));
        assert!(!Stage::Interview.can_advance_to(Stage::Shortlisted));
        assert!(!Stage::Applied.can_advance_to(Stage::Applied));
        for stage in [Stage::Applied, Stage::Shortlisted, Stage::Interview, Stage::Offer] {
            assert!(stage.can_advance_to(Stage::Rejected), "{stage} must allow rejection");
        }
    }

    #[test]
    fn terminal_stages_have_no_exit() {
        for stage in Stage::ALL {
            assert_eq!(stage.is_terminal(), stage.successors().is_empty());
        }
        assert!(Stage::Hired.is_terminal());
        assert!(Stage::Rejected.is_terminal());
    }

    #[test]
    fn permissive_policy_ignores_the_graph() {
        assert!(!StagePolicy::Strict.permits(Stage::Hired, Stage::Applied));
        assert!(StagePolicy::Permissive.permits(Stage::Hired, Stage::Applied));
    }

    #[test]
    fn parsing_rejects_values_outside_the_vocabulary() {
        assert_eq!("Offer".parse::<Stage>().unwrap(), Stage::Offer);
        let err = "onboarding".parse::<Stage>().unwrap_err();
        assert_eq!(err.kind, "stage");
        assert_eq!("permissive".parse::<StagePolicy>().unwrap(), StagePolicy::Permissive);
    }
}
