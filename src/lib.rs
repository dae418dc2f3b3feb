pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::application::StagePolicy;
use crate::services::{
    application_service::ApplicationService,
    audit_service::AuditService,
    credential_service::CredentialService,
    fitment_service::{FitmentScorer, FitmentService, LlmFitmentScorer},
    job_service::JobService,
    lifecycle_service::LifecycleService,
    organization_service::OrganizationService,
    report_service::ReportService,
    resume_service::ResumeService,
    token_service::TokenService,
};
use reqwest::Client;

/// Knobs the state needs, detached from the process-wide [`Config`] so tests
/// can build an app without touching the environment.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub jwt_secret: String,
    pub token_ttl_seconds: Option<i64>,
    pub stage_policy: StagePolicy,
    pub uploads_dir: String,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_seconds: config.token_ttl_seconds,
            stage_policy: config.stage_policy,
            uploads_dir: config.uploads_dir.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub credential_service: CredentialService,
    pub lifecycle_service: LifecycleService,
    pub audit_service: AuditService,
    pub application_service: ApplicationService,
    pub job_service: JobService,
    pub resume_service: ResumeService,
    pub fitment_service: FitmentService,
    pub organization_service: OrganizationService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        settings: AppSettings,
        scorer: Option<Arc<dyn FitmentScorer>>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            &settings.jwt_secret,
            settings.token_ttl_seconds,
        ));
        let audit_service = AuditService::new(store.clone());

        Self {
            credential_service: CredentialService::new(store.clone(), tokens.clone()),
            lifecycle_service: LifecycleService::new(store.clone(), audit_service.clone()),
            application_service: ApplicationService::new(
                store.clone(),
                audit_service.clone(),
                settings.stage_policy,
            ),
            job_service: JobService::new(store.clone(), audit_service.clone()),
            resume_service: ResumeService::new(store.clone(), settings.uploads_dir),
            fitment_service: FitmentService::new(store.clone(), scorer),
            organization_service: OrganizationService::new(store.clone()),
            report_service: ReportService::new(store),
            audit_service,
            tokens,
        }
    }

    /// Production wiring: the LLM scorer is only attached when an API key is configured.
    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Result<Self> {
        let scorer = match &config.scoring {
            Some(scoring) => {
                let http_client = Client::builder()
                    .timeout(std::time::Duration::from_secs(60))
                    .build()
                    .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
                let scorer: Arc<dyn FitmentScorer> = Arc::new(LlmFitmentScorer::new(
                    http_client,
                    scoring.api_url.clone(),
                    scoring.api_key.clone(),
                    scoring.model.clone(),
                ));
                Some(scorer)
            }
            None => {
                tracing::warn!("SCORING_API_KEY not set; fitment scoring is disabled");
                None
            }
        };
        Ok(Self::new(store, AppSettings::from(config), scorer))
    }
}
