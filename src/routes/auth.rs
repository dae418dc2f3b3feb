//! Public registration and login routes for every identity kind.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    dto::auth_dto::{
        LoginPayload, RegisterAdminPayload, RegisterCandidatePayload, RegisterOrganizationPayload,
        RegisterRecruiterPayload,
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = RegisterAdminPayload,
    responses(
        (status = 201, description = "Admin registered"),
        (status = 409, description = "Email or mobile already registered")
    )
)]
#[axum::debug_handler]
pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdminPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.credential_service.register_admin(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token issued"),
        (status = 401, description = "Invalid email or password")
    )
)]
#[axum::debug_handler]
pub async fn login_admin(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.credential_service.login_admin(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/candidates/register",
    request_body = RegisterCandidatePayload,
    responses(
        (status = 201, description = "Candidate registered"),
        (status = 409, description = "Email or mobile already registered")
    )
)]
#[axum::debug_handler]
pub async fn register_candidate(
    State(state): State<AppState>,
    Json(payload): Json<RegisterCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let account = state.credential_service.register_candidate(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[axum::debug_handler]
pub async fn login_candidate(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.credential_service.login_candidate(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/recruiters/register",
    request_body = RegisterRecruiterPayload,
    responses(
        (status = 201, description = "Recruiter registered and attached"),
        (status = 404, description = "No active organization with that id")
    )
)]
#[axum::debug_handler]
pub async fn register_recruiter(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRecruiterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let organization_id = payload
        .organization_id
        .ok_or_else(|| Error::BadRequest("organization_id is required".into()))?;
    let account = state
        .credential_service
        .register_recruiter(organization_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[axum::debug_handler]
pub async fn login_recruiter(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.credential_service.login_recruiter(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/organizations/register",
    request_body = RegisterOrganizationPayload,
    responses(
        (status = 201, description = "Organization registered"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register_organization(
    State(state): State<AppState>,
    Json(payload): Json<RegisterOrganizationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let org = state
        .credential_service
        .register_organization(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(org)))
}

#[axum::debug_handler]
pub async fn login_organization(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.credential_service.login_organization(payload).await?))
}
