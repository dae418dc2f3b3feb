use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::audit_service::AuditService;
use crate::database::{ApplicationStore, JobStore, OrganizationStore, ResumeStore, Store, UserStore};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, ApplicationScope, ApplicationView, NewApplication, Stage,
    StagePolicy, StageUpdate,
};
use crate::models::job::JobStatus;
use crate::models::user::Role;

pub const ADVANCE_STAGE_ACTION: &str = "ADVANCE_STAGE";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateStats {
    pub total: i64,
    pub by_stage: BTreeMap<&'static str, i64>,
    /// Share of applications currently at `offer`, rounded percent.
    pub offer_rate: i64,
}

/// Application Stage Machine.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
    audit: AuditService,
    policy: StagePolicy,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn Store>, audit: AuditService, policy: StagePolicy) -> Self {
        Self {
            store,
            audit,
            policy,
        }
    }

    pub fn policy(&self) -> StagePolicy {
        self.policy
    }

    pub async fn submit(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        resume_id: Uuid,
    ) -> Result<Application> {
        let candidate = self
            .store
            .find_user(candidate_id)
            .await?
            .filter(|u| u.role == Role::Candidate)
            .ok_or_else(|| Error::AccessDenied("only candidates can apply".into()))?;
        if !candidate.is_active {
            return Err(Error::AccountBlocked);
        }

        let job = self
            .store
            .find_job(job_id)
            .await?
            .filter(|j| j.status == JobStatus::Open)
            .ok_or(Error::JobNotOpen)?;
        let org_active = self
            .store
            .find_organization(job.organization_id)
            .await?
            .map_or(false, |o| o.is_active);
        if !org_active {
            return Err(Error::JobNotOpen);
        }

        self.store
            .find_resume(resume_id)
            .await?
            .filter(|r| r.candidate_id == candidate_id)
            .ok_or(Error::ResumeNotOwned)?;

        if self
            .store
            .find_living_application(job_id, candidate_id)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateApplication);
        }

        // The partial unique index still catches a concurrent submit.
        let application = self
            .store
            .insert_application(NewApplication {
                job_id,
                candidate_id,
                resume_id,
            })
            .await?;
        tracing::info!(application_id = %application.id, %job_id, %candidate_id, "application submitted");
        Ok(application)
    }

    pub async fn advance_stage(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
        new_stage: &str,
        decision: Option<String>,
    ) -> Result<Application> {
        let next: Stage = new_stage
            .parse()
            .map_err(|e: crate::models::ParseEnumError| Error::InvalidStage(e.to_string()))?;

        let organization_id = self.recruiter_organization(recruiter_id).await?;
        let not_found =
            || Error::NotFound("Application not found or not your organization".to_string());

        let application = self
            .store
            .find_application(application_id)
            .await?
            .ok_or_else(not_found)?;
        let job = self
            .store
            .find_job(application.job_id)
            .await?
            .ok_or_else(not_found)?;
        if job.organization_id != organization_id {
            return Err(not_found());
        }

        let current = application.stage;
        if !self.policy.permits(current, next) {
            return Err(Error::InvalidStage(format!(
                "cannot move from {} to {}",
                current, next
            )));
        }

        let decision = decision.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        let updated = self
            .store
            .update_stage(StageUpdate {
                application_id,
                expected: current,
                next,
                decision: decision.clone(),
                actor_id: recruiter_id,
            })
            .await?
            .ok_or_else(|| Error::Conflict("Application stage changed concurrently".into()))?;

        self.audit.log(
            recruiter_id,
            ADVANCE_STAGE_ACTION,
            "application",
            application_id,
            json!({
                "from": current,
                "to": next,
                "decision": decision,
                "job_id": job.id,
                "organization_id": organization_id,
            }),
        );
        tracing::info!(%application_id, %recruiter_id, from = %current, to = %next, "stage advanced");
        Ok(updated)
    }

    pub async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>> {
        self.store
            .list_applications(ApplicationScope::Candidate(candidate_id), filter)
            .await
    }

    pub async fn list_for_recruiter(
        &self,
        recruiter_id: Uuid,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>> {
        let organization_id = self.recruiter_organization(recruiter_id).await?;
        self.list_for_organization(organization_id, filter).await
    }

    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>> {
        self.store
            .list_applications(ApplicationScope::Organization(organization_id), filter)
            .await
    }

    pub async fn list_all(&self, filter: ApplicationFilter) -> Result<Vec<ApplicationView>> {
        self.store
            .list_applications(ApplicationScope::Platform, filter)
            .await
    }

    pub async fn candidate_stats(&self, candidate_id: Uuid) -> Result<CandidateStats> {
        let counts = self.store.stage_counts(candidate_id).await?;
        let mut by_stage: BTreeMap<&'static str, i64> =
            Stage::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for (stage, count) in counts {
            by_stage.insert(stage.as_str(), count);
        }
        let total: i64 = by_stage.values().sum();
        let offers = by_stage.get(Stage::Offer.as_str()).copied().unwrap_or(0);
        let offer_rate = if total > 0 {
            ((offers as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };
        Ok(CandidateStats {
            total,
            by_stage,
            offer_rate,
        })
    }

    /// Organization of a recruiter, taken from the living membership row
    /// rather than the token so a detached recruiter loses access at once.
    pub async fn recruiter_organization(&self, recruiter_id: Uuid) -> Result<Uuid> {
        self.store
            .find_membership(recruiter_id)
            .await?
            .map(|m| m.organization_id)
            .ok_or_else(|| Error::AccessDenied("recruiter is not attached to an organization".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::job::NewJob;
    use crate::models::organization::{NewOrgUser, NewOrganization};
    use crate::models::resume::NewResume;
    use crate::models::user::NewUser;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ApplicationService,
        audit: AuditService,
        candidate: Uuid,
        recruiter: Uuid,
        job: Uuid,
        resume: Uuid,
    }

    async fn fixture(policy: StagePolicy) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let audit = AuditService::new(store.clone());
        let service = ApplicationService::new(store.clone(), audit.clone(), policy);

        let org = store
            .insert_organization(NewOrganization {
                name: "Acme".into(),
                email: "hr@acme.io".into(),
                password_hash: "x".into(),
                website: None,
                description: None,
            })
            .await
            .unwrap();
        let recruiter = store
            .insert_user(NewUser {
                role: Role::Recruiter,
                email: "rec@acme.io".into(),
                mobile: "3001".into(),
                password_hash: "x".into(),
            })
            .await
            .unwrap();
        store
            .insert_org_user(NewOrgUser {
                user_id: recruiter.id,
                organization_id: org.id,
                name: "Rec".into(),
                position: "Lead".into(),
                org_role: "recruiter".into(),
            })
            .await
            .unwrap();
        let candidate = store
            .insert_user(NewUser {
                role: Role::Candidate,
                email: "cand@x.io".into(),
                mobile: "3002".into(),
                password_hash: "x".into(),
            })
            .await
            .unwrap();
        let job = store
            .insert_job(NewJob {
                organization_id: org.id,
                created_by: recruiter.id,
                title: "Backend engineer".into(),
                location_type: "remote".into(),
                employment_type: "full-time".into(),
                experience_min: Some(2),
                experience_max: None,
                skills_required: vec!["rust".into()],
                description: None,
                status: JobStatus::Open,
            })
            .await
            .unwrap();
        let resume = store
            .insert_resume(NewResume {
                candidate_id: candidate.id,
                storage_path: "resumes/cv.pdf".into(),
                version_label: None,
                source: "upload".into(),
            })
            .await
            .unwrap();

        Fixture {
            store,
            service,
            audit,
            candidate: candidate.id,
            recruiter: recruiter.id,
            job: job.id,
            resume: resume.id,
        }
    }

    #[tokio::test]
    async fn submit_starts_at_applied_and_rejects_duplicates() {
        let f = fixture(StagePolicy::Strict).await;
        let app = f.service.submit(f.candidate, f.job, f.resume).await.unwrap();
        assert_eq!(app.stage, Stage::Applied);

        let err = f.service.submit(f.candidate, f.job, f.resume).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateApplication));
    }

    #[tokio::test]
    async fn submit_checks_job_and_resume() {
        let f = fixture(StagePolicy::Strict).await;
        f.store
            .set_job_status(f.job, None, JobStatus::Closed)
            .await
            .unwrap();
        let err = f.service.submit(f.candidate, f.job, f.resume).await.unwrap_err();
        assert!(matches!(err, Error::JobNotOpen));

        f.store.set_job_status(f.job, None, JobStatus::Open).await.unwrap();
        let err = f
            .service
            .submit(f.candidate, f.job, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResumeNotOwned));
    }

    #[tokio::test]
    async fn strict_policy_walks_the_graph_and_stops_at_terminal() {
        let f = fixture(StagePolicy::Strict).await;
        let app = f.service.submit(f.candidate, f.job, f.resume).await.unwrap();

        let err = f
            .service
            .advance_stage(f.recruiter, app.id, "offer", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStage(_)));

        for stage in ["shortlisted", "interview", "offer", "hired"] {
            f.service
                .advance_stage(f.recruiter, app.id, stage, None)
                .await
                .unwrap();
        }
        let err = f
            .service
            .advance_stage(f.recruiter, app.id, "rejected", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStage(_)));

        f.audit.drain().await;
        let rows = f.audit.query(Default::default()).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.action == ADVANCE_STAGE_ACTION));
        assert_eq!(rows[0].payload["to"], "hired");
    }

    #[tokio::test]
    async fn unknown_stage_is_invalid_even_when_permissive() {
        let f = fixture(StagePolicy::Permissive).await;
        let app = f.service.submit(f.candidate, f.job, f.resume).await.unwrap();

        let err = f
            .service
            .advance_stage(f.recruiter, app.id, "onboarding", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStage(_)));

        let jumped = f
            .service
            .advance_stage(f.recruiter, app.id, "hired", Some("fast track".into()))
            .await
            .unwrap();
        assert_eq!(jumped.stage, Stage::Hired);
        assert_eq!(jumped.decision.as_deref(), Some("fast track"));
    }

    #[tokio::test]
    async fn foreign_recruiter_cannot_advance() {
        let f = fixture(StagePolicy::Strict).await;
        let app = f.service.submit(f.candidate, f.job, f.resume).await.unwrap();

        let err = f
            .service
            .advance_stage(Uuid::new_v4(), app.id, "shortlisted", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }

    #[tokio::test]
    async fn stats_count_offers() {
        let f = fixture(StagePolicy::Permissive).await;
        let app = f.service.submit(f.candidate, f.job, f.resume).await.unwrap();
        f.service
            .advance_stage(f.recruiter, app.id, "offer", None)
            .await
            .unwrap();

        let stats = f.service.candidate_stats(f.candidate).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_stage["offer"], 1);
        assert_eq!(stats.by_stage["applied"], 0);
        assert_eq!(stats.offer_rate, 100);
    }
}
