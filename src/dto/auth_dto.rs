use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::auth::RequestIdentity;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAdminPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "crate::utils::validation::validate_mobile"))]
    pub mobile: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterCandidatePayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "crate::utils::validation::validate_mobile"))]
    pub mobile: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_skills"))]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterOrganizationPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(url)]
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Recruiter registration. `organization_id` is required on the public
/// route and ignored on the organization route, where the token decides.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRecruiterPayload {
    pub organization_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub position: String,
    #[validate(length(min = 1, max = 50))]
    pub org_role: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "crate::utils::validation::validate_mobile"))]
    pub mobile: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse<P> {
    pub token: String,
    pub identity: RequestIdentity,
    pub profile: P,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_skills"))]
    pub skills: Vec<String>,
}
