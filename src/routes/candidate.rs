use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::{ApplicationListQuery, SubmitApplicationPayload},
        auth_dto::UpdateProfilePayload,
    },
    error::{Error, Result},
    middleware::auth::RequestIdentity,
    models::user::Role,
    AppState,
};

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.credential_service.candidate_account(candidate_id).await?))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    payload.validate()?;
    let profile = state
        .credential_service
        .update_profile(
            candidate_id,
            &payload.name,
            payload.headline.as_deref(),
            &payload.skills,
        )
        .await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.job_service.list_open().await?))
}

#[axum::debug_handler]
pub async fn recommended_jobs(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.job_service.recommended(candidate_id).await?))
}

#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.job_service.get_open(id).await?))
}

/// Multipart upload: file field `resume`, optional text field `version_label`.
#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    identity: RequestIdentity,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    let mut file = None;
    let mut version_label = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        Error::BadRequest(e.to_string())
    })? {
        match field.name() {
            Some("resume") => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(e.to_string()))?;
                file = Some((filename, data));
            }
            Some("version_label") => {
                version_label = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| Error::BadRequest("multipart field `resume` is required".into()))?;
    let resume = state
        .resume_service
        .upload(candidate_id, &filename, data, version_label)
        .await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

#[axum::debug_handler]
pub async fn list_resumes(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.resume_service.list(candidate_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/candidates/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application created at stage applied"),
        (status = 409, description = "Already applied to this job"),
        (status = 422, description = "Job not open or resume not owned")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    let application = state
        .application_service
        .submit(candidate_id, payload.job_id, payload.resume_id)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    let rows = state
        .application_service
        .list_for_candidate(candidate_id, query.into_filter()?)
        .await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn application_stats(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.application_service.candidate_stats(candidate_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/candidates/jobs/{id}/fitment",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Fitment scored and stored"),
        (status = 502, description = "Scoring collaborator unavailable")
    )
)]
#[axum::debug_handler]
pub async fn score_fitment(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.fitment_service.score(candidate_id, job_id).await?))
}

#[axum::debug_handler]
pub async fn get_fitment(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate_id = identity.require_role(&[Role::Candidate])?;
    Ok(Json(state.fitment_service.latest(candidate_id, job_id).await?))
}
