use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    ApplicationStore, AuditStore, BlockableStore, FitmentStore, JobStore, OrganizationStore,
    PlatformCounts, ReportStore, ResumeStore, UserStore,
};
use crate::error::{Error, Result};
use crate::models::{
    application::{
        Application, ApplicationFilter, ApplicationScope, ApplicationView, NewApplication, Stage,
        StageUpdate,
    },
    audit_log::{AuditQuery, AuditRecord, NewAuditRecord},
    candidate_profile::CandidateProfile,
    fitment::{FitmentResult, FitmentScore},
    job::{Job, JobFilter, JobStatus, JobView, NewJob},
    organization::{NewOrgUser, NewOrganization, OrgUser, Organization, RecruiterView},
    resume::{NewResume, Resume},
    user::{NewUser, Role, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    profiles: HashMap<Uuid, CandidateProfile>,
    organizations: Vec<Organization>,
    org_users: Vec<OrgUser>,
    jobs: Vec<Job>,
    resumes: Vec<Resume>,
    applications: Vec<Application>,
    audit_logs: Vec<AuditRecord>,
    fitment: HashMap<(Uuid, Uuid), FitmentScore>,
}

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Intended for tests and local runs without Postgres.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_audit: AtomicBool,
    fail_resumes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent audit insert fail.
    pub fn fail_audit_writes(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent resume insert fail.
    pub fn fail_resume_writes(&self, fail: bool) {
        self.fail_resumes.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.write()?;
        let taken = tables.users.iter().any(|u| {
            u.email.eq_ignore_ascii_case(&user.email) || u.mobile == user.mobile
        });
        if taken {
            return Err(Error::Conflict("Email or mobile already registered".into()));
        }
        let row = User {
            id: Uuid::new_v4(),
            role: user.role,
            email: user.email,
            mobile: user.mobile,
            password_hash: user.password_hash,
            is_active: true,
            profile_photo_ref: None,
            created_at: Utc::now(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str, role: Role) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.role == role && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn identity_taken(&self, email: &str, mobile: &str) -> Result<bool> {
        Ok(self
            .read()?
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) || u.mobile == mobile))
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        name: &str,
        headline: Option<&str>,
        skills: &[String],
    ) -> Result<CandidateProfile> {
        let mut tables = self.write()?;
        let profile = tables
            .profiles
            .entry(user_id)
            .and_modify(|p| {
                p.name = name.to_string();
                p.headline = headline.map(str::to_string);
                p.skills = skills.to_vec();
                p.updated_at = Some(Utc::now());
            })
            .or_insert_with(|| CandidateProfile {
                user_id,
                name: name.to_string(),
                headline: headline.map(str::to_string),
                skills: skills.to_vec(),
                created_at: Utc::now(),
                updated_at: None,
            });
        Ok(profile.clone())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>> {
        Ok(self.read()?.profiles.get(&user_id).cloned())
    }
}

#[async_trait]
impl BlockableStore<User> for MemoryStore {
    async fn find_blockable(&self, id: Uuid) -> Result<Option<User>> {
        self.find_user(id).await
    }

    async fn transition_active(&self, id: Uuid, from: bool, to: bool) -> Result<bool> {
        let mut tables = self.write()?;
        match tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.is_active == from && u.role != Role::Admin)
        {
            Some(user) => {
                user.is_active = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_state(&self, active: bool) -> Result<Vec<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .rev()
            .filter(|u| u.is_active == active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BlockableStore<Organization> for MemoryStore {
    async fn find_blockable(&self, id: Uuid) -> Result<Option<Organization>> {
        self.find_organization(id).await
    }

    async fn transition_active(&self, id: Uuid, from: bool, to: bool) -> Result<bool> {
        let mut tables = self.write()?;
        match tables
            .organizations
            .iter_mut()
            .find(|o| o.id == id && o.is_active == from)
        {
            Some(org) => {
                org.is_active = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_state(&self, active: bool) -> Result<Vec<Organization>> {
        Ok(self
            .read()?
            .organizations
            .iter()
            .rev()
            .filter(|o| o.is_active == active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn insert_organization(&self, org: NewOrganization) -> Result<Organization> {
        let mut tables = self.write()?;
        if tables
            .organizations
            .iter()
            .any(|o| o.email.eq_ignore_ascii_case(&org.email))
        {
            return Err(Error::Conflict("Organization email already registered".into()));
        }
        let row = Organization {
            id: Uuid::new_v4(),
            name: org.name,
            email: org.email,
            password_hash: org.password_hash,
            website: org.website,
            description: org.description,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.organizations.push(row.clone());
        Ok(row)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        Ok(self.read()?.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn find_organization_by_email(&self, email: &str) -> Result<Option<Organization>> {
        Ok(self
            .read()?
            .organizations
            .iter()
            .find(|o| o.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_org_user(&self, member: NewOrgUser) -> Result<OrgUser> {
        let mut tables = self.write()?;
        if tables
            .org_users
            .iter()
            .any(|m| m.user_id == member.user_id && !m.is_deleted)
        {
            return Err(Error::Conflict("Recruiter already belongs to an organization".into()));
        }
        let row = OrgUser {
            id: Uuid::new_v4(),
            user_id: member.user_id,
            organization_id: member.organization_id,
            name: member.name,
            position: member.position,
            org_role: member.org_role,
            is_deleted: false,
            created_at: Utc::now(),
        };
        tables.org_users.push(row.clone());
        Ok(row)
    }

    async fn find_membership(&self, user_id: Uuid) -> Result<Option<OrgUser>> {
        Ok(self
            .read()?
            .org_users
            .iter()
            .find(|m| m.user_id == user_id && !m.is_deleted)
            .cloned())
    }

    async fn list_recruiters(&self, organization_id: Uuid) -> Result<Vec<RecruiterView>> {
        let tables = self.read()?;
        let rows = tables
            .org_users
            .iter()
            .rev()
            .filter(|m| m.organization_id == organization_id && !m.is_deleted)
            .filter_map(|m| {
                let user = tables.users.iter().find(|u| u.id == m.user_id)?;
                Some(RecruiterView {
                    user_id: m.user_id,
                    organization_id: m.organization_id,
                    name: m.name.clone(),
                    position: m.position.clone(),
                    org_role: m.org_role.clone(),
                    email: user.email.clone(),
                    mobile: user.mobile.clone(),
                    is_active: user.is_active,
                    created_at: m.created_at,
                })
            })
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let row = Job {
            id: Uuid::new_v4(),
            organization_id: job.organization_id,
            created_by: job.created_by,
            title: job.title,
            location_type: job.location_type,
            employment_type: job.employment_type,
            experience_min: job.experience_min,
            experience_max: job.experience_max,
            skills_required: job.skills_required,
            description: job.description,
            status: job.status,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.write()?.jobs.push(row.clone());
        Ok(row)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self
            .read()?
            .jobs
            .iter()
            .find(|j| j.id == id && !j.is_deleted)
            .cloned())
    }

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<JobView>> {
        let tables = self.read()?;
        let rows = tables
            .jobs
            .iter()
            .rev()
            .filter(|j| !j.is_deleted)
            .filter(|j| filter.organization_id.map_or(true, |id| j.organization_id == id))
            .filter(|j| filter.status.map_or(true, |s| j.status == s))
            .filter_map(|j| {
                let org = tables
                    .organizations
                    .iter()
                    .find(|o| o.id == j.organization_id)?;
                if filter.active_organizations_only && !org.is_active {
                    return None;
                }
                Some(JobView {
                    job: j.clone(),
                    organization_name: org.name.clone(),
                })
            })
            .collect();
        Ok(rows)
    }

    async fn recommend_jobs(&self, skills: &[String], limit: usize) -> Result<Vec<JobView>> {
        let tables = self.read()?;
        let mut scored: Vec<(usize, JobView)> = tables
            .jobs
            .iter()
            .rev()
            .filter(|j| !j.is_deleted && j.status == JobStatus::Open)
            .filter_map(|j| {
                let org = tables
                    .organizations
                    .iter()
                    .find(|o| o.id == j.organization_id && o.is_active)?;
                let shared = j.skills_required.iter().filter(|s| skills.contains(s)).count();
                (shared > 0).then(|| {
                    (
                        shared,
                        JobView {
                            job: j.clone(),
                            organization_name: org.name.clone(),
                        },
                    )
                })
            })
            .collect();
        // Stable sort keeps newest first among equal matches.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(limit).map(|(_, view)| view).collect())
    }

    async fn set_job_status(
        &self,
        id: Uuid,
        expected: Option<JobStatus>,
        status: JobStatus,
    ) -> Result<Option<Job>> {
        let mut tables = self.write()?;
        let job = tables.jobs.iter_mut().find(|j| {
            j.id == id && !j.is_deleted && expected.map_or(true, |e| j.status == e)
        });
        Ok(job.map(|j| {
            j.status = status;
            j.updated_at = Some(Utc::now());
            j.clone()
        }))
    }

    async fn soft_delete_job(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        match tables.jobs.iter_mut().find(|j| j.id == id && !j.is_deleted) {
            Some(job) => {
                job.is_deleted = true;
                job.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn insert_resume(&self, resume: NewResume) -> Result<Resume> {
        if self.fail_resumes.load(Ordering::SeqCst) {
            return Err(Error::Internal("resume table unavailable".to_string()));
        }
        let mut tables = self.write()?;
        let version_label = resume.version_label.unwrap_or_else(|| {
            let existing = tables
                .resumes
                .iter()
                .filter(|r| r.candidate_id == resume.candidate_id)
                .count();
            format!("v{}", existing + 1)
        });
        let row = Resume {
            id: Uuid::new_v4(),
            candidate_id: resume.candidate_id,
            storage_path: resume.storage_path,
            version_label,
            source: resume.source,
            is_deleted: false,
            created_at: Utc::now(),
        };
        tables.resumes.push(row.clone());
        Ok(row)
    }

    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        Ok(self
            .read()?
            .resumes
            .iter()
            .find(|r| r.id == id && !r.is_deleted)
            .cloned())
    }

    async fn list_resumes(&self, candidate_id: Uuid) -> Result<Vec<Resume>> {
        Ok(self
            .read()?
            .resumes
            .iter()
            .rev()
            .filter(|r| r.candidate_id == candidate_id && !r.is_deleted)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let mut tables = self.write()?;
        let duplicate = tables.applications.iter().any(|a| {
            a.job_id == application.job_id
                && a.candidate_id == application.candidate_id
                && !a.is_deleted
        });
        if duplicate {
            return Err(Error::DuplicateApplication);
        }
        let row = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            candidate_id: application.candidate_id,
            resume_id: application.resume_id,
            stage: Stage::Applied,
            decision: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
            updated_by: None,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self
            .read()?
            .applications
            .iter()
            .find(|a| a.id == id && !a.is_deleted)
            .cloned())
    }

    async fn find_living_application(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>> {
        Ok(self
            .read()?
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.candidate_id == candidate_id && !a.is_deleted)
            .cloned())
    }

    async fn update_stage(&self, update: StageUpdate) -> Result<Option<Application>> {
        let mut tables = self.write()?;
        let row = tables.applications.iter_mut().find(|a| {
            a.id == update.application_id && a.stage == update.expected && !a.is_deleted
        });
        Ok(row.map(|a| {
            a.stage = update.next;
            a.decision = update.decision;
            a.updated_at = Some(Utc::now());
            a.updated_by = Some(update.actor_id);
            a.clone()
        }))
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>> {
        let tables = self.read()?;
        let rows = tables
            .applications
            .iter()
            .rev()
            .filter(|a| !a.is_deleted)
            .filter(|a| filter.stage.map_or(true, |s| a.stage == s))
            .filter(|a| filter.job_id.map_or(true, |id| a.job_id == id))
            .filter_map(|a| {
                let job = tables.jobs.iter().find(|j| j.id == a.job_id)?;
                let org = tables
                    .organizations
                    .iter()
                    .find(|o| o.id == job.organization_id)?;
                let user = tables.users.iter().find(|u| u.id == a.candidate_id)?;
                let in_scope = match scope {
                    ApplicationScope::Candidate(id) => a.candidate_id == id,
                    ApplicationScope::Organization(id) => !job.is_deleted && org.id == id,
                    ApplicationScope::Platform => true,
                };
                if !in_scope {
                    return None;
                }
                let resume = tables
                    .resumes
                    .iter()
                    .find(|r| r.id == a.resume_id && !r.is_deleted);
                let fitment = tables.fitment.get(&(a.candidate_id, a.job_id));
                Some(ApplicationView {
                    id: a.id,
                    job_id: a.job_id,
                    candidate_id: a.candidate_id,
                    resume_id: a.resume_id,
                    stage: a.stage,
                    decision: a.decision.clone(),
                    created_at: a.created_at,
                    updated_at: a.updated_at,
                    job_title: job.title.clone(),
                    job_status: job.status.as_str().to_string(),
                    organization_id: org.id,
                    organization_name: org.name.clone(),
                    candidate_email: user.email.clone(),
                    candidate_name: tables.profiles.get(&a.candidate_id).map(|p| p.name.clone()),
                    resume_path: resume.map(|r| r.storage_path.clone()),
                    resume_label: resume.map(|r| r.version_label.clone()),
                    fitment_score: fitment.map(|f| f.score),
                    fitment_explanation: fitment.map(|f| f.explanation.clone()),
                })
            })
            .collect();
        Ok(rows)
    }

    async fn stage_counts(&self, candidate_id: Uuid) -> Result<Vec<(Stage, i64)>> {
        let tables = self.read()?;
        let mut counts: HashMap<Stage, i64> = HashMap::new();
        for a in tables
            .applications
            .iter()
            .filter(|a| a.candidate_id == candidate_id && !a.is_deleted)
        {
            *counts.entry(a.stage).or_default() += 1;
        }
        Ok(Stage::ALL
            .into_iter()
            .filter_map(|s| counts.get(&s).map(|c| (s, *c)))
            .collect())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn insert_audit(&self, record: NewAuditRecord) -> Result<AuditRecord> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(Error::Internal("audit sink unavailable".to_string()));
        }
        let row = AuditRecord {
            id: Uuid::new_v4(),
            actor_id: record.actor_id,
            action: record.action,
            target_type: record.target_type,
            target_id: record.target_id,
            payload: record.payload,
            created_at: Utc::now(),
        };
        self.write()?.audit_logs.push(row.clone());
        Ok(row)
    }

    async fn query_audit(&self, query: AuditQuery) -> Result<Vec<AuditRecord>> {
        let limit = query.effective_limit() as usize;
        Ok(self
            .read()?
            .audit_logs
            .iter()
            .rev()
            .filter(|r| {
                query
                    .target_type
                    .as_deref()
                    .map_or(true, |t| r.target_type == t)
            })
            .filter(|r| query.target_id.map_or(true, |id| r.target_id == id))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FitmentStore for MemoryStore {
    async fn upsert_fitment(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        result: FitmentResult,
    ) -> Result<FitmentScore> {
        let mut tables = self.write()?;
        let row = tables
            .fitment
            .entry((candidate_id, job_id))
            .and_modify(|f| {
                f.score = result.score;
                f.explanation = result.explanation.clone();
                f.updated_at = Some(Utc::now());
            })
            .or_insert_with(|| FitmentScore {
                candidate_id,
                job_id,
                score: result.score,
                explanation: result.explanation.clone(),
                created_at: Utc::now(),
                updated_at: None,
            });
        Ok(row.clone())
    }

    async fn find_fitment(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<FitmentScore>> {
        Ok(self.read()?.fitment.get(&(candidate_id, job_id)).cloned())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn platform_counts(&self) -> Result<PlatformCounts> {
        let tables = self.read()?;
        Ok(PlatformCounts {
            users: tables.users.iter().filter(|u| u.is_active).count() as i64,
            organizations: tables.organizations.iter().filter(|o| o.is_active).count() as i64,
            jobs: tables.jobs.iter().filter(|j| !j.is_deleted).count() as i64,
            applications: tables.applications.iter().filter(|a| !a.is_deleted).count() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, mobile: &str, role: Role) -> NewUser {
        NewUser {
            role,
            email: email.to_string(),
            mobile: mobile.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn transition_only_lands_once() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(new_user("a@x.io", "100", Role::Candidate))
            .await
            .unwrap();

        assert!(BlockableStore::<User>::transition_active(&store, user.id, true, false)
            .await
            .unwrap());
        assert!(!BlockableStore::<User>::transition_active(&store, user.id, true, false)
            .await
            .unwrap());
        let blocked = BlockableStore::<User>::list_by_state(&store, false).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].id, user.id);
    }

    #[tokio::test]
    async fn admins_never_transition() {
        let store = MemoryStore::new();
        let admin = store
            .insert_user(new_user("root@x.io", "1", Role::Admin))
            .await
            .unwrap();
        let flipped = BlockableStore::<User>::transition_active(
            &store,
            admin.id,
            true,
            false,
        )
        .await
        .unwrap();
        assert!(!flipped);
    }

    #[tokio::test]
    async fn duplicate_identity_is_a_conflict() {
        let store = MemoryStore::new();
        store
            .insert_user(new_user("dup@x.io", "5", Role::Candidate))
            .await
            .unwrap();
        let err = store
            .insert_user(new_user("DUP@x.io", "6", Role::Recruiter))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn stage_update_requires_expected_stage() {
        let store = MemoryStore::new();
        let app = store
            .insert_application(NewApplication {
                job_id: Uuid::new_v4(),
                candidate_id: Uuid::new_v4(),
                resume_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        let stale = StageUpdate {
            application_id: app.id,
            expected: Stage::Shortlisted,
            next: Stage::Interview,
            decision: None,
            actor_id: Uuid::new_v4(),
        };
        assert!(store.update_stage(stale).await.unwrap().is_none());

        let fresh = StageUpdate {
            application_id: app.id,
            expected: Stage::Applied,
            next: Stage::Shortlisted,
            decision: Some("strong profile".into()),
            actor_id: Uuid::new_v4(),
        };
        let updated = store.update_stage(fresh).await.unwrap().unwrap();
        assert_eq!(updated.stage, Stage::Shortlisted);
    }

    #[tokio::test]
    async fn audit_limit_is_clamped() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .insert_audit(NewAuditRecord {
                    actor_id: Uuid::new_v4(),
                    action: "BLOCK_USER".into(),
                    target_type: "user".into(),
                    target_id: Uuid::new_v4(),
                    payload: serde_json::json!({}),
                })
                .await
                .unwrap();
        }
        let rows = store
            .query_audit(AuditQuery {
                limit: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
