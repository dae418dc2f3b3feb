#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use jobboard_backend::{
    database::{MemoryStore, Store},
    error::Result,
    models::{application::StagePolicy, fitment::FitmentResult},
    routes,
    services::fitment_service::FitmentScorer,
    AppSettings, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";
pub const PASSWORD: &str = "correct-horse-battery";

/// Returns a fixed score so HTTP tests never leave the process.
pub struct FixedScorer(pub i32);

#[async_trait]
impl FitmentScorer for FixedScorer {
    async fn score(&self, candidate_skills: &[String], _job_description: &str) -> Result<FitmentResult> {
        Ok(FitmentResult {
            score: self.0,
            explanation: format!("{} matching skills", candidate_skills.len()),
        })
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub router: Router,
}

pub struct Account {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(StagePolicy::Strict)
    }

    pub fn with_policy(stage_policy: StagePolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let uploads_dir = std::env::temp_dir().join(format!("jobboard-test-{}", Uuid::new_v4()));
        let settings = AppSettings {
            jwt_secret: JWT_SECRET.to_string(),
            token_ttl_seconds: Some(3600),
            stage_policy,
            uploads_dir: uploads_dir.to_string_lossy().into_owned(),
        };
        let state = AppState::new(dyn_store, settings, Some(Arc::new(FixedScorer(87))));
        let router = routes::router(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, json)
    }

    pub async fn admin(&self) -> Account {
        let email = unique_email("admin");
        let (status, body) = self
            .call(
                "POST",
                "/api/admin/register",
                None,
                Some(json!({
                    "name": "Root",
                    "email": email,
                    "mobile": unique_mobile(),
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.login("/api/admin/login", &email).await
    }

    pub async fn candidate(&self, skills: &[&str]) -> Account {
        let email = unique_email("candidate");
        let (status, body) = self
            .call(
                "POST",
                "/api/candidates/register",
                None,
                Some(json!({
                    "name": "Ada Candidate",
                    "email": email,
                    "mobile": unique_mobile(),
                    "password": PASSWORD,
                    "headline": "Backend engineer",
                    "skills": skills
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.login("/api/candidates/login", &email).await
    }

    pub async fn organization(&self) -> Account {
        let email = unique_email("org");
        let (status, body) = self
            .call(
                "POST",
                "/api/organizations/register",
                None,
                Some(json!({
                    "name": "Acme Hiring",
                    "email": email,
                    "password": PASSWORD,
                    "website": "https://acme.example.com"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.login("/api/organizations/login", &email).await
    }

    pub async fn recruiter(&self, organization_id: Uuid) -> Account {
        let email = unique_email("recruiter");
        let (status, body) = self
            .call(
                "POST",
                "/api/recruiters/register",
                None,
                Some(json!({
                    "organization_id": organization_id,
                    "name": "Rita Recruiter",
                    "position": "Talent Partner",
                    "email": email,
                    "mobile": unique_mobile(),
                    "password": PASSWORD
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        self.login("/api/recruiters/login", &email).await
    }

    async fn login(&self, uri: &str, email: &str) -> Account {
        let (status, body) = self
            .call(
                "POST",
                uri,
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        Account {
            id: body["identity"]["subject_id"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .expect("subject id"),
            token: body["token"].as_str().expect("token").to_string(),
        }
    }

    pub async fn open_job(&self, recruiter: &Account, title: &str) -> Uuid {
        let (status, body) = self
            .call(
                "POST",
                "/api/recruiters/jobs",
                Some(&recruiter.token),
                Some(json!({
                    "title": title,
                    "location_type": "remote",
                    "employment_type": "full-time",
                    "experience_min": 2,
                    "experience_max": 6,
                    "skills_required": ["rust", "postgres"],
                    "description": "Build the hiring platform"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().and_then(|s| s.parse().ok()).expect("job id")
    }

    pub async fn resume(&self, candidate: &Account) -> Uuid {
        self.state
            .resume_service
            .upload(
                candidate.id,
                "cv.pdf",
                Bytes::from_static(b"%PDF-1.7 test resume"),
                None,
            )
            .await
            .expect("upload resume")
            .id
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, Uuid::new_v4().simple())
}

pub fn unique_mobile() -> String {
    format!("+1{:010}", Uuid::new_v4().as_u128() % 10_000_000_000)
}
