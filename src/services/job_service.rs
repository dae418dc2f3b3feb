use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::audit_service::AuditService;
use super::credential_service::normalize_skills;
use crate::database::{JobStore, OrganizationStore, Store, UserStore};
use crate::dto::job_dto::CreateJobPayload;
use crate::error::{Error, Result};
use crate::models::job::{Job, JobFilter, JobStatus, JobView, NewJob};

pub const CLOSE_JOB_ACTION: &str = "CLOSE_JOB";

const RECOMMENDATION_LIMIT: usize = 10;

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
    audit: AuditService,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, audit: AuditService) -> Self {
        Self { store, audit }
    }

    /// The recruiter's organization, which must still be active.
    async fn recruiter_organization(&self, recruiter_id: Uuid) -> Result<Uuid> {
        let membership = self
            .store
            .find_membership(recruiter_id)
            .await?
            .ok_or_else(|| Error::AccessDenied("recruiter is not attached to an organization".into()))?;
        let org = self
            .store
            .find_organization(membership.organization_id)
            .await?
            .ok_or_else(|| Error::NotFound("Organization not found".into()))?;
        if !org.is_active {
            return Err(Error::AccountBlocked);
        }
        Ok(org.id)
    }

    async fn owned_job(&self, recruiter_id: Uuid, job_id: Uuid) -> Result<Job> {
        let organization_id = self.recruiter_organization(recruiter_id).await?;
        self.store
            .find_job(job_id)
            .await?
            .filter(|j| j.organization_id == organization_id)
            .ok_or_else(|| Error::NotFound("Job not found or not your organization".into()))
    }

    pub async fn create(&self, recruiter_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let organization_id = self.recruiter_organization(recruiter_id).await?;
        let status = payload.initial_status()?;
        let job = self
            .store
            .insert_job(NewJob {
                organization_id,
                created_by: recruiter_id,
                title: payload.title.trim().to_string(),
                location_type: payload.location_type.trim().to_string(),
                employment_type: payload.employment_type.trim().to_string(),
                experience_min: payload.experience_min,
                experience_max: payload.experience_max,
                skills_required: normalize_skills(&payload.skills_required),
                description: payload.description,
                status,
            })
            .await?;
        tracing::info!(job_id = %job.id, %organization_id, "job created");
        Ok(job)
    }

    pub async fn list_for_recruiter(
        &self,
        recruiter_id: Uuid,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobView>> {
        let organization_id = self.recruiter_organization(recruiter_id).await?;
        self.store
            .list_jobs(JobFilter {
                organization_id: Some(organization_id),
                status,
                active_organizations_only: false,
            })
            .await
    }

    pub async fn set_status(&self, recruiter_id: Uuid, job_id: Uuid, status: JobStatus) -> Result<Job> {
        self.owned_job(recruiter_id, job_id).await?;
        self.store
            .set_job_status(job_id, None, status)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn delete(&self, recruiter_id: Uuid, job_id: Uuid) -> Result<()> {
        self.owned_job(recruiter_id, job_id).await?;
        if !self.store.soft_delete_job(job_id).await? {
            return Err(Error::NotFound("Job not found".into()));
        }
        tracing::info!(%job_id, %recruiter_id, "job deleted");
        Ok(())
    }

    /// Open jobs of active organizations.
    pub async fn list_open(&self) -> Result<Vec<JobView>> {
        self.store
            .list_jobs(JobFilter {
                organization_id: None,
                status: Some(JobStatus::Open),
                active_organizations_only: true,
            })
            .await
    }

    /// An open job whose organization is active, with the organization name.
    pub async fn get_open(&self, job_id: Uuid) -> Result<JobView> {
        let not_found = || Error::NotFound("Job not found".into());
        let job = self
            .store
            .find_job(job_id)
            .await?
            .filter(|j| j.status == JobStatus::Open)
            .ok_or_else(not_found)?;
        let org = self
            .store
            .find_organization(job.organization_id)
            .await?
            .filter(|o| o.is_active)
            .ok_or_else(not_found)?;
        Ok(JobView {
            job,
            organization_name: org.name,
        })
    }

    /// Open jobs matching the candidate's profile skills. Empty when the
    /// profile lists no skills.
    pub async fn recommended(&self, candidate_id: Uuid) -> Result<Vec<JobView>> {
        let profile = self
            .store
            .find_profile(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".into()))?;
        if profile.skills.is_empty() {
            return Ok(Vec::new());
        }
        let jobs = self
            .store
            .recommend_jobs(&profile.skills, RECOMMENDATION_LIMIT)
            .await?;
        tracing::debug!(%candidate_id, matches = jobs.len(), "recommended jobs");
        Ok(jobs)
    }

    pub async fn list_all(&self, status: Option<JobStatus>) -> Result<Vec<JobView>> {
        self.store
            .list_jobs(JobFilter {
                organization_id: None,
                status,
                active_organizations_only: false,
            })
            .await
    }

    pub async fn close(&self, admin_id: Uuid, job_id: Uuid, reason: Option<String>) -> Result<Job> {
        let job = self
            .store
            .set_job_status(job_id, Some(JobStatus::Open), JobStatus::Closed)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No open job with id {}", job_id)))?;
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Admin closed job".to_string());
        self.audit.log(
            admin_id,
            CLOSE_JOB_ACTION,
            "job",
            job_id,
            json!({ "reason": reason, "title": job.title, "organization_id": job.organization_id }),
        );
        Ok(job)
    }
}
