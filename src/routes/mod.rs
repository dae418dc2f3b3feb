pub mod admin;
pub mod auth;
pub mod candidate;
pub mod health;
pub mod organization;
pub mod recruiter;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{middleware::auth::resolve_identity, services::resume_service::MAX_RESUME_BYTES, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_admin,
        auth::login_admin,
        auth::register_candidate,
        auth::register_recruiter,
        auth::register_organization,
        admin::block_user,
        admin::unblock_user,
        admin::block_organization,
        admin::unblock_organization,
        admin::close_job,
        candidate::submit_application,
        candidate::score_fitment,
        recruiter::create_job,
        recruiter::advance_stage,
    ),
    tags((name = "jobboard", description = "Multi-tenant job platform API"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router. Everything outside `public` passes through
/// [`resolve_identity`] before reaching its handler.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/admin/register", post(auth::register_admin))
        .route("/api/admin/login", post(auth::login_admin))
        .route("/api/candidates/register", post(auth::register_candidate))
        .route("/api/candidates/login", post(auth::login_candidate))
        .route("/api/recruiters/register", post(auth::register_recruiter))
        .route("/api/recruiters/login", post(auth::login_recruiter))
        .route("/api/organizations/register", post(auth::register_organization))
        .route("/api/organizations/login", post(auth::login_organization));

    let admin = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/profile", get(admin::profile))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id/block", post(admin::block_user))
        .route("/api/admin/users/:id/unblock", post(admin::unblock_user))
        .route("/api/admin/organizations", get(admin::list_organizations))
        .route(
            "/api/admin/organizations/:id/block",
            post(admin::block_organization),
        )
        .route(
            "/api/admin/organizations/:id/unblock",
            post(admin::unblock_organization),
        )
        .route("/api/admin/jobs", get(admin::list_jobs))
        .route("/api/admin/jobs/:id/close", post(admin::close_job))
        .route("/api/admin/applications", get(admin::list_applications))
        .route("/api/admin/audit", get(admin::list_audit));

    let candidates = Router::new()
        .route(
            "/api/candidates/me",
            get(candidate::me).put(candidate::update_profile),
        )
        .route("/api/candidates/jobs", get(candidate::list_jobs))
        .route("/api/candidates/jobs/:id", get(candidate::get_job))
        .route(
            "/api/candidates/recommended/jobs",
            get(candidate::recommended_jobs),
        )
        .route(
            "/api/candidates/jobs/:id/fitment",
            post(candidate::score_fitment),
        )
        .route(
            "/api/candidates/fitment/:job_id",
            get(candidate::get_fitment),
        )
        .route(
            "/api/candidates/resumes",
            get(candidate::list_resumes).post(candidate::upload_resume),
        )
        .route(
            "/api/candidates/applications",
            get(candidate::list_applications).post(candidate::submit_application),
        )
        .route(
            "/api/candidates/stats/applications",
            get(candidate::application_stats),
        );

    let recruiters = Router::new()
        .route(
            "/api/recruiters/jobs",
            get(recruiter::list_jobs).post(recruiter::create_job),
        )
        .route("/api/recruiters/jobs/:id", delete(recruiter::delete_job))
        .route(
            "/api/recruiters/jobs/:id/status",
            patch(recruiter::update_job_status),
        )
        .route(
            "/api/recruiters/jobs/:id/applications",
            get(recruiter::job_applications),
        )
        .route(
            "/api/recruiters/applications",
            get(recruiter::list_applications),
        )
        .route(
            "/api/recruiters/applications/:id/stage",
            put(recruiter::advance_stage),
        );

    let organizations = Router::new()
        .route("/api/organizations/me", get(organization::me))
        .route(
            "/api/organizations/recruiters",
            get(organization::list_recruiters).post(organization::add_recruiter),
        )
        .route(
            "/api/organizations/applications",
            get(organization::list_applications),
        );

    let protected = admin
        .merge(candidates)
        .merge(recruiters)
        .merge(organizations)
        .layer(axum::middleware::from_fn_with_state(
            state.tokens.clone(),
            resolve_identity,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 1024 * 1024))
}
