//! Persistence seams.
//!
//! Services talk to storage only through the traits below. `PgStore` backs
//! them with Postgres; `MemoryStore` keeps everything in process for tests
//! and database-less local runs.

pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    application::{
        Application, ApplicationFilter, ApplicationScope, ApplicationView, NewApplication, Stage,
        StageUpdate,
    },
    audit_log::{AuditQuery, AuditRecord, NewAuditRecord},
    blockable::Blockable,
    candidate_profile::CandidateProfile,
    fitment::{FitmentResult, FitmentScore},
    job::{Job, JobFilter, JobStatus, JobView, NewJob},
    organization::{NewOrgUser, NewOrganization, OrgUser, Organization, RecruiterView},
    resume::{NewResume, Resume},
    user::{NewUser, Role, User},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub users: i64,
    pub organizations: i64,
    pub jobs: i64,
    pub applications: i64,
}

/// Active-state access for one kind of [`Blockable`] entity.
#[async_trait]
pub trait BlockableStore<T: Blockable>: Send + Sync {
    async fn find_blockable(&self, id: Uuid) -> Result<Option<T>>;

    /// Flips `is_active` from `from` to `to` only if the row still holds `from`
    /// and is not protected. Returns whether this call performed the flip.
    async fn transition_active(&self, id: Uuid, from: bool, to: bool) -> Result<bool>;

    async fn list_by_state(&self, active: bool) -> Result<Vec<T>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str, role: Role) -> Result<Option<User>>;

    async fn identity_taken(&self, email: &str, mobile: &str) -> Result<bool>;

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        name: &str,
        headline: Option<&str>,
        skills: &[String],
    ) -> Result<CandidateProfile>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn insert_organization(&self, org: NewOrganization) -> Result<Organization>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>>;

    async fn find_organization_by_email(&self, email: &str) -> Result<Option<Organization>>;

    async fn insert_org_user(&self, member: NewOrgUser) -> Result<OrgUser>;

    /// The living membership row of a recruiter, if any.
    async fn find_membership(&self, user_id: Uuid) -> Result<Option<OrgUser>>;

    async fn list_recruiters(&self, organization_id: Uuid) -> Result<Vec<RecruiterView>>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: NewJob) -> Result<Job>;

    /// Non-deleted job by id.
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>>;

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<JobView>>;

    /// Open jobs of active organizations sharing at least one required skill
    /// with `skills`, most shared skills first, then newest.
    async fn recommend_jobs(&self, skills: &[String], limit: usize) -> Result<Vec<JobView>>;

    /// Sets the status; when `expected` is given the update only lands if the
    /// job still holds that status.
    async fn set_job_status(
        &self,
        id: Uuid,
        expected: Option<JobStatus>,
        status: JobStatus,
    ) -> Result<Option<Job>>;

    async fn soft_delete_job(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Labels are assigned under a per-candidate lock so concurrent uploads
    /// never share a `vN`.
    async fn insert_resume(&self, resume: NewResume) -> Result<Resume>;

    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>>;

    async fn list_resumes(&self, candidate_id: Uuid) -> Result<Vec<Resume>>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `DuplicateApplication` when a living application already
    /// exists for the (job, candidate) pair.
    async fn insert_application(&self, application: NewApplication) -> Result<Application>;

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>>;

    async fn find_living_application(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>>;

    /// Conditional stage write; `None` when the stage moved underneath us.
    async fn update_stage(&self, update: StageUpdate) -> Result<Option<Application>>;

    async fn list_applications(
        &self,
        scope: ApplicationScope,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>>;

    async fn stage_counts(&self, candidate_id: Uuid) -> Result<Vec<(Stage, i64)>>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_audit(&self, record: NewAuditRecord) -> Result<AuditRecord>;

    async fn query_audit(&self, query: AuditQuery) -> Result<Vec<AuditRecord>>;
}

#[async_trait]
pub trait FitmentStore: Send + Sync {
    async fn upsert_fitment(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        result: FitmentResult,
    ) -> Result<FitmentScore>;

    async fn find_fitment(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<FitmentScore>>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn platform_counts(&self) -> Result<PlatformCounts>;
}

/// Everything the services need from storage.
pub trait Store:
    UserStore
    + OrganizationStore
    + JobStore
    + ResumeStore
    + ApplicationStore
    + AuditStore
    + FitmentStore
    + ReportStore
    + BlockableStore<User>
    + BlockableStore<Organization>
    + 'static
{
}

impl<S> Store for S where
    S: UserStore
        + OrganizationStore
        + JobStore
        + ResumeStore
        + ApplicationStore
        + AuditStore
        + FitmentStore
        + ReportStore
        + BlockableStore<User>
        + BlockableStore<Organization>
        + 'static
{
}
