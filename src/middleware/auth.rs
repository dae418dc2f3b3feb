//! Request Context Resolver.
//!
//! Protected routers sit behind [`resolve_identity`], which verifies the
//! token and inserts a [`RequestIdentity`] into the request extensions.
//! Handlers extract it and apply their own role gates. Public routes simply
//! live on a router without this layer.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::services::token_service::TokenService;

pub const TOKEN_HEADER: &str = "token";

/// Who is making the request, as asserted by a verified token.
///
/// `role` is absent for organization-direct tokens; `organization_id` is
/// present for organization and attached-recruiter tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestIdentity {
    pub subject_id: Uuid,
    pub role: Option<Role>,
    pub organization_id: Option<Uuid>,
}

impl RequestIdentity {
    pub fn user(subject_id: Uuid, role: Role, organization_id: Option<Uuid>) -> Self {
        Self {
            subject_id,
            role: Some(role),
            organization_id,
        }
    }

    pub fn organization(organization_id: Uuid) -> Self {
        Self {
            subject_id: organization_id,
            role: None,
            organization_id: Some(organization_id),
        }
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<Uuid> {
        match self.role {
            Some(role) if allowed.contains(&role) => Ok(self.subject_id),
            _ => Err(Error::AccessDenied(format!(
                "requires role {}",
                allowed
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ")
            ))),
        }
    }

    /// Organization-direct tokens only.
    pub fn require_organization(&self) -> Result<Uuid> {
        match (self.role, self.organization_id) {
            (None, Some(org_id)) => Ok(org_id),
            _ => Err(Error::AccessDenied("requires an organization token".into())),
        }
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(raw) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        let raw = raw.trim();
        if !raw.is_empty() {
            return Some(raw);
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn resolve_identity(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers()) else {
        return Error::MissingToken.into_response();
    };
    match tokens.verify(token) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .copied()
            .ok_or(Error::MissingToken)
    }
}
