use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::{AdvanceStagePayload, ApplicationListQuery},
        job_dto::{parse_status, CreateJobPayload, JobListQuery, UpdateJobStatusPayload},
    },
    error::{Error, Result},
    middleware::auth::RequestIdentity,
    models::user::Role,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/recruiters/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    payload.validate()?;
    let job = state.job_service.create(recruiter_id, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    let jobs = state
        .job_service
        .list_for_recruiter(recruiter_id, query.status()?)
        .await?;
    Ok(Json(jobs))
}

#[axum::debug_handler]
pub async fn update_job_status(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobStatusPayload>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    payload.validate()?;
    let status = parse_status(Some(payload.status.as_str()))?
        .ok_or_else(|| Error::BadRequest("status is required".into()))?;
    Ok(Json(state.job_service.set_status(recruiter_id, id, status).await?))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    state.job_service.delete(recruiter_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    let rows = state
        .application_service
        .list_for_recruiter(recruiter_id, query.into_filter()?)
        .await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    let mut filter = query.into_filter()?;
    filter.job_id = Some(job_id);
    let rows = state
        .application_service
        .list_for_recruiter(recruiter_id, filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/recruiters/applications/{id}/stage",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = AdvanceStagePayload,
    responses(
        (status = 200, description = "Stage advanced"),
        (status = 404, description = "Application not found or not your organization"),
        (status = 409, description = "Stage changed concurrently"),
        (status = 422, description = "Stage outside the vocabulary or transition graph")
    )
)]
#[axum::debug_handler]
pub async fn advance_stage(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceStagePayload>,
) -> Result<impl IntoResponse> {
    let recruiter_id = identity.require_role(&[Role::Recruiter])?;
    payload.validate()?;
    let application = state
        .application_service
        .advance_stage(recruiter_id, id, &payload.stage, payload.decision)
        .await?;
    Ok(Json(application))
}
