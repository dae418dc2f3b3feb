use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin_dto::{AuditListQuery, LifecyclePayload, StateListQuery},
        application_dto::ApplicationListQuery,
        job_dto::JobListQuery,
    },
    error::Result,
    middleware::auth::RequestIdentity,
    models::{organization::Organization, user::{Role, User}},
    AppState,
};

fn reason_of(body: Option<Json<LifecyclePayload>>) -> Result<Option<String>> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    Ok(payload.reason)
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    Ok(Json(state.report_service.dashboard().await?))
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    Ok(Json(state.credential_service.admin_account(admin_id).await?))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<StateListQuery>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    let users = state
        .lifecycle_service
        .list_users(query.active()?, query.role()?)
        .await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/block",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = LifecyclePayload,
    responses(
        (status = 200, description = "User blocked"),
        (status = 404, description = "No active, non-admin user with that id")
    )
)]
#[axum::debug_handler]
pub async fn block_user(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<LifecyclePayload>>,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    let reason = reason_of(body)?;
    let user: User = state.lifecycle_service.block(admin_id, id, reason).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/unblock",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = LifecyclePayload,
    responses(
        (status = 200, description = "User unblocked"),
        (status = 404, description = "No blocked user with that id")
    )
)]
#[axum::debug_handler]
pub async fn unblock_user(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<LifecyclePayload>>,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    let reason = reason_of(body)?;
    let user: User = state.lifecycle_service.unblock(admin_id, id, reason).await?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn list_organizations(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<StateListQuery>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    let orgs = state
        .lifecycle_service
        .list::<Organization>(query.active()?)
        .await?;
    Ok(Json(orgs))
}

#[utoipa::path(
    post,
    path = "/api/admin/organizations/{id}/block",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = LifecyclePayload,
    responses(
        (status = 200, description = "Organization blocked"),
        (status = 404, description = "No active organization with that id")
    )
)]
#[axum::debug_handler]
pub async fn block_organization(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<LifecyclePayload>>,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    let reason = reason_of(body)?;
    let org: Organization = state.lifecycle_service.block(admin_id, id, reason).await?;
    Ok(Json(org))
}

#[utoipa::path(
    post,
    path = "/api/admin/organizations/{id}/unblock",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = LifecyclePayload,
    responses(
        (status = 200, description = "Organization unblocked"),
        (status = 404, description = "No blocked organization with that id")
    )
)]
#[axum::debug_handler]
pub async fn unblock_organization(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<LifecyclePayload>>,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    let reason = reason_of(body)?;
    let org: Organization = state.lifecycle_service.unblock(admin_id, id, reason).await?;
    Ok(Json(org))
}

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    Ok(Json(state.job_service.list_all(query.status()?).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/close",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = LifecyclePayload,
    responses(
        (status = 200, description = "Job closed"),
        (status = 404, description = "No open job with that id")
    )
)]
#[axum::debug_handler]
pub async fn close_job(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(id): Path<Uuid>,
    body: Option<Json<LifecyclePayload>>,
) -> Result<impl IntoResponse> {
    let admin_id = identity.require_role(&[Role::Admin])?;
    let reason = reason_of(body)?;
    Ok(Json(state.job_service.close(admin_id, id, reason).await?))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    let rows = state
        .application_service
        .list_all(query.into_filter()?)
        .await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn list_audit(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<AuditListQuery>,
) -> Result<impl IntoResponse> {
    identity.require_role(&[Role::Admin])?;
    Ok(Json(state.audit_service.query(query.into()).await?))
}
