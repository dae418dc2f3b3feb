use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
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

const USER_COLUMNS: &str = "id, role, email, mobile, password_hash, is_active, profile_photo_ref, created_at";
const ORG_COLUMNS: &str = "id, name, email, password_hash, website, description, is_active, created_at";
const ORG_USER_COLUMNS: &str = "id, user_id, organization_id, name, position, org_role, is_deleted, created_at";
const PROFILE_COLUMNS: &str = "user_id, name, headline, skills, created_at, updated_at";
const JOB_COLUMNS: &str = "id, organization_id, created_by, title, location_type, employment_type, experience_min, experience_max, skills_required, description, status, is_deleted, created_at, updated_at";
const RESUME_COLUMNS: &str = "id, candidate_id, storage_path, version_label, source, is_deleted, created_at";
const APPLICATION_COLUMNS: &str = "id, job_id, candidate_id, resume_id, stage, decision, is_deleted, created_at, updated_at, updated_by";
const AUDIT_COLUMNS: &str = "id, actor_id, action, target_type, target_id, payload, created_at";
const FITMENT_COLUMNS: &str = "candidate_id, job_id, score, explanation, created_at, updated_at";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-index violation to `on_conflict`, everything else through `From`.
fn map_unique(err: sqlx::Error, on_conflict: Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_conflict,
        _ => err.into(),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, role, email, mobile, password_hash) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.role.as_str())
            .bind(&user.email)
            .bind(&user.mobile)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, Error::Conflict("Email or mobile already registered".into())))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str, role: Role) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) AND role = $2 LIMIT 1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn identity_taken(&self, email: &str, mobile: &str) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1) OR mobile = $2)",
        )
        .bind(email)
        .bind(mobile)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        name: &str,
        headline: Option<&str>,
        skills: &[String],
    ) -> Result<CandidateProfile> {
        let sql = format!(
            r#"
            INSERT INTO candidate_profiles (user_id, name, headline, skills)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
                SET name = EXCLUDED.name,
                    headline = EXCLUDED.headline,
                    skills = EXCLUDED.skills,
                    updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(user_id)
            .bind(name)
            .bind(headline)
            .bind(skills.to_vec())
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM candidate_profiles WHERE user_id = $1");
        let profile = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }
}

#[async_trait]
impl BlockableStore<User> for PgStore {
    async fn find_blockable(&self, id: Uuid) -> Result<Option<User>> {
        self.find_user(id).await
    }

    async fn transition_active(&self, id: Uuid, from: bool, to: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = $3
            WHERE id = $1 AND is_active = $2 AND role <> 'admin'
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_by_state(&self, active: bool) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = $1 ORDER BY created_at DESC"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(active)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[async_trait]
impl BlockableStore<Organization> for PgStore {
    async fn find_blockable(&self, id: Uuid) -> Result<Option<Organization>> {
        self.find_organization(id).await
    }

    async fn transition_active(&self, id: Uuid, from: bool, to: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET is_active = $3
            WHERE id = $1 AND is_active = $2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_by_state(&self, active: bool) -> Result<Vec<Organization>> {
        let sql = format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE is_active = $1 ORDER BY created_at DESC"
        );
        let orgs = sqlx::query_as::<_, Organization>(&sql)
            .bind(active)
            .fetch_all(&self.pool)
            .await?;
        Ok(orgs)
    }
}

#[async_trait]
impl OrganizationStore for PgStore {
    async fn insert_organization(&self, org: NewOrganization) -> Result<Organization> {
        let sql = format!(
            r#"
            INSERT INTO organizations (id, name, email, password_hash, website, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORG_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Organization>(&sql)
            .bind(Uuid::new_v4())
            .bind(&org.name)
            .bind(&org.email)
            .bind(&org.password_hash)
            .bind(&org.website)
            .bind(&org.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, Error::Conflict("Organization email already registered".into())))
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        let sql = format!("SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1");
        let org = sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(org)
    }

    async fn find_organization_by_email(&self, email: &str) -> Result<Option<Organization>> {
        let sql = format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE lower(email) = lower($1) LIMIT 1"
        );
        let org = sqlx::query_as::<_, Organization>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(org)
    }

    async fn insert_org_user(&self, member: NewOrgUser) -> Result<OrgUser> {
        let sql = format!(
            r#"
            INSERT INTO org_users (id, user_id, organization_id, name, position, org_role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORG_USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, OrgUser>(&sql)
            .bind(Uuid::new_v4())
            .bind(member.user_id)
            .bind(member.organization_id)
            .bind(&member.name)
            .bind(&member.position)
            .bind(&member.org_role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, Error::Conflict("Recruiter already belongs to an organization".into())))
    }

    async fn find_membership(&self, user_id: Uuid) -> Result<Option<OrgUser>> {
        let sql = format!(
            "SELECT {ORG_USER_COLUMNS} FROM org_users WHERE user_id = $1 AND NOT is_deleted LIMIT 1"
        );
        let member = sqlx::query_as::<_, OrgUser>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn list_recruiters(&self, organization_id: Uuid) -> Result<Vec<RecruiterView>> {
        let rows = sqlx::query_as::<_, RecruiterView>(
            r#"
            SELECT ou.user_id, ou.organization_id, ou.name, ou.position, ou.org_role,
                   u.email, u.mobile, u.is_active, ou.created_at
            FROM org_users ou
            JOIN users u ON u.id = ou.user_id
            WHERE ou.organization_id = $1 AND NOT ou.is_deleted
            ORDER BY ou.created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let sql = format!(
            r#"
            INSERT INTO jobs (
                id, organization_id, created_by, title, location_type, employment_type,
                experience_min, experience_max, skills_required, description, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(Uuid::new_v4())
            .bind(job.organization_id)
            .bind(job.created_by)
            .bind(&job.title)
            .bind(&job.location_type)
            .bind(&job.employment_type)
            .bind(job.experience_min)
            .bind(job.experience_max)
            .bind(&job.skills_required)
            .bind(&job.description)
            .bind(job.status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND NOT is_deleted");
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<JobView>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT j.id, j.organization_id, j.created_by, j.title, j.location_type,
                   j.employment_type, j.experience_min, j.experience_max, j.skills_required,
                   j.description, j.status, j.is_deleted, j.created_at, j.updated_at,
                   o.name AS organization_name
            FROM jobs j
            JOIN organizations o ON o.id = j.organization_id
            WHERE NOT j.is_deleted
            "#,
        );
        if let Some(org_id) = filter.organization_id {
            qb.push(" AND j.organization_id = ").push_bind(org_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND j.status = ").push_bind(status.as_str());
        }
        if filter.active_organizations_only {
            qb.push(" AND o.is_active");
        }
        qb.push(" ORDER BY j.created_at DESC");

        let rows = qb.build_query_as::<JobView>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn recommend_jobs(&self, skills: &[String], limit: usize) -> Result<Vec<JobView>> {
        let rows = sqlx::query_as::<_, JobView>(
            r#"
            SELECT j.id, j.organization_id, j.created_by, j.title, j.location_type,
                   j.employment_type, j.experience_min, j.experience_max, j.skills_required,
                   j.description, j.status, j.is_deleted, j.created_at, j.updated_at,
                   o.name AS organization_name
            FROM jobs j
            JOIN organizations o ON o.id = j.organization_id
            WHERE NOT j.is_deleted
              AND j.status = 'open'
              AND o.is_active
              AND j.skills_required && $1::text[]
            ORDER BY cardinality(ARRAY(
                         SELECT unnest(j.skills_required)
                         INTERSECT
                         SELECT unnest($1::text[])
                     )) DESC,
                     j.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(skills.to_vec())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_job_status(
        &self,
        id: Uuid,
        expected: Option<JobStatus>,
        status: JobStatus,
    ) -> Result<Option<Job>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE jobs SET status = ");
        qb.push_bind(status.as_str())
            .push(", updated_at = NOW() WHERE NOT is_deleted AND id = ")
            .push_bind(id);
        if let Some(expected) = expected {
            qb.push(" AND status = ").push_bind(expected.as_str());
        }
        qb.push(format!(" RETURNING {JOB_COLUMNS}"));

        let job = qb.build_query_as::<Job>().fetch_optional(&self.pool).await?;
        Ok(job)
    }

    async fn soft_delete_job(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ResumeStore for PgStore {
    async fn insert_resume(&self, resume: NewResume) -> Result<Resume> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(resume.candidate_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO resumes (id, candidate_id, storage_path, version_label, source)
            VALUES (
                $1, $2, $3,
                COALESCE($4, 'v' || ((SELECT COUNT(*) FROM resumes WHERE candidate_id = $2) + 1)),
                $5
            )
            RETURNING {RESUME_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Resume>(&sql)
            .bind(Uuid::new_v4())
            .bind(resume.candidate_id)
            .bind(&resume.storage_path)
            .bind(&resume.version_label)
            .bind(&resume.source)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        let sql = format!("SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1 AND NOT is_deleted");
        let row = sqlx::query_as::<_, Resume>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_resumes(&self, candidate_id: Uuid) -> Result<Vec<Resume>> {
        let sql = format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE candidate_id = $1 AND NOT is_deleted ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Resume>(&sql)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let sql = format!(
            r#"
            INSERT INTO applications (id, job_id, candidate_id, resume_id, stage)
            VALUES ($1, $2, $3, $4, 'applied')
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Application>(&sql)
            .bind(Uuid::new_v4())
            .bind(application.job_id)
            .bind(application.candidate_id)
            .bind(application.resume_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, Error::DuplicateApplication))
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND NOT is_deleted"
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_living_application(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1 AND candidate_id = $2 AND NOT is_deleted"
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(job_id)
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_stage(&self, update: StageUpdate) -> Result<Option<Application>> {
        let sql = format!(
            r#"
            UPDATE applications
            SET stage = $2, decision = $3, updated_at = NOW(), updated_by = $4
            WHERE id = $1 AND stage = $5 AND NOT is_deleted
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(update.application_id)
            .bind(update.next.as_str())
            .bind(&update.decision)
            .bind(update.actor_id)
            .bind(update.expected.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationView>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT a.id, a.job_id, a.candidate_id, a.resume_id, a.stage, a.decision,
                   a.created_at, a.updated_at,
                   j.title AS job_title, j.status AS job_status,
                   o.id AS organization_id, o.name AS organization_name,
                   u.email AS candidate_email, cp.name AS candidate_name,
                   r.storage_path AS resume_path, r.version_label AS resume_label,
                   fs.score AS fitment_score, fs.explanation AS fitment_explanation
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN organizations o ON o.id = j.organization_id
            JOIN users u ON u.id = a.candidate_id
            LEFT JOIN candidate_profiles cp ON cp.user_id = a.candidate_id
            LEFT JOIN resumes r ON r.id = a.resume_id AND NOT r.is_deleted
            LEFT JOIN fitment_scores fs ON fs.candidate_id = a.candidate_id AND fs.job_id = a.job_id
            WHERE NOT a.is_deleted
            "#,
        );
        match scope {
            ApplicationScope::Candidate(candidate_id) => {
                qb.push(" AND a.candidate_id = ").push_bind(candidate_id);
            }
            ApplicationScope::Organization(org_id) => {
                qb.push(" AND NOT j.is_deleted AND j.organization_id = ")
                    .push_bind(org_id);
            }
            ApplicationScope::Platform => {}
        }
        if let Some(stage) = filter.stage {
            qb.push(" AND a.stage = ").push_bind(stage.as_str());
        }
        if let Some(job_id) = filter.job_id {
            qb.push(" AND a.job_id = ").push_bind(job_id);
        }
        qb.push(" ORDER BY a.created_at DESC");

        let rows = qb
            .build_query_as::<ApplicationView>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn stage_counts(&self, candidate_id: Uuid) -> Result<Vec<(Stage, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT stage, COUNT(*)
            FROM applications
            WHERE candidate_id = $1 AND NOT is_deleted
            GROUP BY stage
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(stage, count)| {
                stage
                    .parse::<Stage>()
                    .map(|s| (s, count))
                    .map_err(|e| Error::Internal(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn insert_audit(&self, record: NewAuditRecord) -> Result<AuditRecord> {
        let sql = format!(
            r#"
            INSERT INTO audit_logs (id, actor_id, action, target_type, target_id, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {AUDIT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AuditRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(record.actor_id)
            .bind(&record.action)
            .bind(&record.target_type)
            .bind(record.target_id)
            .bind(&record.payload)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn query_audit(&self, query: AuditQuery) -> Result<Vec<AuditRecord>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE TRUE"));
        if let Some(target_type) = &query.target_type {
            qb.push(" AND target_type = ").push_bind(target_type.clone());
        }
        if let Some(target_id) = query.target_id {
            qb.push(" AND target_id = ").push_bind(target_id);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.effective_limit());

        let rows = qb.build_query_as::<AuditRecord>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

#[async_trait]
impl FitmentStore for PgStore {
    async fn upsert_fitment(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        result: FitmentResult,
    ) -> Result<FitmentScore> {
        let sql = format!(
            r#"
            INSERT INTO fitment_scores (candidate_id, job_id, score, explanation)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (candidate_id, job_id) DO UPDATE
                SET score = EXCLUDED.score,
                    explanation = EXCLUDED.explanation,
                    updated_at = NOW()
            RETURNING {FITMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, FitmentScore>(&sql)
            .bind(candidate_id)
            .bind(job_id)
            .bind(result.score)
            .bind(&result.explanation)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_fitment(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<FitmentScore>> {
        let sql = format!(
            "SELECT {FITMENT_COLUMNS} FROM fitment_scores WHERE candidate_id = $1 AND job_id = $2"
        );
        let row = sqlx::query_as::<_, FitmentScore>(&sql)
            .bind(candidate_id)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn platform_counts(&self) -> Result<PlatformCounts> {
        let (users, organizations, jobs, applications) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users WHERE is_active),
                    (SELECT COUNT(*) FROM organizations WHERE is_active),
                    (SELECT COUNT(*) FROM jobs WHERE NOT is_deleted),
                    (SELECT COUNT(*) FROM applications WHERE NOT is_deleted)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;
        Ok(PlatformCounts {
            users,
            organizations,
            jobs,
            applications,
        })
    }
}
