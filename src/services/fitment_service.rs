use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::database::{FitmentStore, JobStore, OrganizationStore, Store, UserStore};
use crate::error::{Error, Result};
use crate::models::fitment::{FitmentResult, FitmentScore};
use crate::models::job::JobStatus;

/// Black-box compatibility scorer between a candidate's skills and a job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FitmentScorer: Send + Sync {
    async fn score(&self, candidate_skills: &[String], job_description: &str) -> Result<FitmentResult>;
}

/// Scores through a chat-completions endpoint that answers in JSON.
pub struct LlmFitmentScorer {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmFitmentScorer {
    pub fn new(client: Client, api_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }

    async fn chat(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Scoring(format!("scoring API error {}: {}", status, text)));
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| Error::Scoring("invalid scoring response format".into()))
    }
}

#[async_trait]
impl FitmentScorer for LlmFitmentScorer {
    async fn score(&self, candidate_skills: &[String], job_description: &str) -> Result<FitmentResult> {
        let payload = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "system",
                    "content": "You rate how well a candidate fits a job. Reply with JSON {\"score\": <integer 0-100>, \"explanation\": <two or three sentences>}."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Candidate skills: {}\n\nJob:\n{}",
                        candidate_skills.join(", "),
                        job_description
                    )
                }
            ]
        });
        let raw = self.chat(payload).await?;
        parse_fitment(&raw)
    }
}

/// Accepts a numeric or string score and clamps it to 0..=100.
pub fn parse_fitment(raw: &JsonValue) -> Result<FitmentResult> {
    let score = match raw.get("score") {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::Scoring("scoring response has no score".into()))?;
    let explanation = raw
        .get("explanation")
        .and_then(|e| e.as_str())
        .map(|e| e.trim().to_string())
        .unwrap_or_default();
    Ok(FitmentResult {
        score: score.round().clamp(0.0, 100.0) as i32,
        explanation,
    })
}

#[derive(Clone)]
pub struct FitmentService {
    store: Arc<dyn Store>,
    scorer: Option<Arc<dyn FitmentScorer>>,
}

impl FitmentService {
    pub fn new(store: Arc<dyn Store>, scorer: Option<Arc<dyn FitmentScorer>>) -> Self {
        Self { store, scorer }
    }

    /// Scores the candidate against an open job of an active organization and
    /// replaces any earlier score.
    pub async fn score(&self, candidate_id: Uuid, job_id: Uuid) -> Result<FitmentScore> {
        let scorer = self
            .scorer
            .as_ref()
            .ok_or_else(|| Error::Scoring("fitment scoring is not configured".into()))?;
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
        let skills = self
            .store
            .find_profile(candidate_id)
            .await?
            .map(|p| p.skills)
            .unwrap_or_default();
        if skills.is_empty() {
            return Err(Error::BadRequest(
                "Add skills to your profile before requesting a fitment score".into(),
            ));
        }

        let result = scorer.score(&skills, &job.scoring_description()).await?;
        let result = FitmentResult {
            score: result.score.clamp(0, 100),
            explanation: result.explanation,
        };
        let saved = self.store.upsert_fitment(candidate_id, job_id, result).await?;
        tracing::info!(%candidate_id, %job_id, score = saved.score, "fitment scored");
        Ok(saved)
    }

    pub async fn latest(&self, candidate_id: Uuid, job_id: Uuid) -> Result<FitmentScore> {
        self.store
            .find_fitment(candidate_id, job_id)
            .await?
            .ok_or_else(|| Error::NotFound("No fitment score for this job yet".into()))
    }
}
