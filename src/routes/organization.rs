use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    dto::{application_dto::ApplicationListQuery, auth_dto::RegisterRecruiterPayload},
    error::Result,
    middleware::auth::RequestIdentity,
    AppState,
};

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let org_id = identity.require_organization()?;
    Ok(Json(state.organization_service.profile(org_id).await?))
}

#[axum::debug_handler]
pub async fn list_recruiters(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let org_id = identity.require_organization()?;
    Ok(Json(state.organization_service.recruiters(org_id).await?))
}

#[axum::debug_handler]
pub async fn add_recruiter(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<RegisterRecruiterPayload>,
) -> Result<impl IntoResponse> {
    let org_id = identity.require_organization()?;
    payload.validate()?;
    let account = state
        .credential_service
        .register_recruiter(org_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let org_id = identity.require_organization()?;
    let rows = state
        .application_service
        .list_for_organization(org_id, query.into_filter()?)
        .await?;
    Ok(Json(rows))
}
