use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::token_service::TokenService;
use crate::database::{OrganizationStore, Store, UserStore};
use crate::dto::auth_dto::{
    LoginPayload, LoginResponse, RegisterAdminPayload, RegisterCandidatePayload,
    RegisterOrganizationPayload, RegisterRecruiterPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::RequestIdentity;
use crate::models::candidate_profile::CandidateProfile;
use crate::models::organization::{NewOrgUser, NewOrganization, OrgUser, Organization};
use crate::models::user::{NewUser, Role, User};
use crate::utils::crypto::{hash_password, verify_password};

const DEFAULT_ORG_ROLE: &str = "recruiter";

#[derive(Debug, Clone, Serialize)]
pub struct CandidateAccount {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<CandidateProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruiterAccount {
    #[serde(flatten)]
    pub user: User,
    pub membership: Option<OrgUser>,
}

/// Credential Store: registration and login for every identity kind.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    async fn create_user(&self, role: Role, email: &str, mobile: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let mobile = mobile.trim().to_string();
        if self.store.identity_taken(&email, &mobile).await? {
            return Err(Error::Conflict("Email or mobile already registered".into()));
        }
        let password_hash = hash_password(password)?;
        let user = self
            .store
            .insert_user(NewUser {
                role,
                email,
                mobile,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %role, "identity registered");
        Ok(user)
    }

    pub async fn register_admin(&self, payload: RegisterAdminPayload) -> Result<User> {
        self.create_user(Role::Admin, &payload.email, &payload.mobile, &payload.password)
            .await
    }

    pub async fn register_candidate(
        &self,
        payload: RegisterCandidatePayload,
    ) -> Result<CandidateAccount> {
        let user = self
            .create_user(Role::Candidate, &payload.email, &payload.mobile, &payload.password)
            .await?;
        let skills = normalize_skills(&payload.skills);
        let profile = self
            .store
            .upsert_profile(user.id, payload.name.trim(), payload.headline.as_deref(), &skills)
            .await?;
        Ok(CandidateAccount {
            user,
            profile: Some(profile),
        })
    }

    pub async fn register_organization(
        &self,
        payload: RegisterOrganizationPayload,
    ) -> Result<Organization> {
        let email = payload.email.trim().to_lowercase();
        if self.store.find_organization_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("Organization email already registered".into()));
        }
        let org = self
            .store
            .insert_organization(NewOrganization {
                name: payload.name.trim().to_string(),
                email,
                password_hash: hash_password(&payload.password)?,
                website: payload.website,
                description: payload.description,
            })
            .await?;
        tracing::info!(organization_id = %org.id, "organization registered");
        Ok(org)
    }

    /// Creates a recruiter identity attached to an active organization.
    pub async fn register_recruiter(
        &self,
        organization_id: Uuid,
        payload: RegisterRecruiterPayload,
    ) -> Result<RecruiterAccount> {
        let org = self
            .store
            .find_organization(organization_id)
            .await?
            .filter(|o| o.is_active)
            .ok_or_else(|| Error::NotFound(format!("No active organization with id {}", organization_id)))?;

        let user = self
            .create_user(Role::Recruiter, &payload.email, &payload.mobile, &payload.password)
            .await?;
        let membership = self
            .store
            .insert_org_user(NewOrgUser {
                user_id: user.id,
                organization_id: org.id,
                name: payload.name.trim().to_string(),
                position: payload.position.trim().to_string(),
                org_role: payload
                    .org_role
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_ORG_ROLE.to_string()),
            })
            .await?;
        Ok(RecruiterAccount {
            user,
            membership: Some(membership),
        })
    }

    async fn authenticate_user(&self, role: Role, payload: &LoginPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        let user = self
            .store
            .find_user_by_email(&email, role)
            .await?
            .ok_or(Error::InvalidCredentials)?;
        if !verify_password(&payload.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "login rejected: bad password");
            return Err(Error::InvalidCredentials);
        }
        if !user.is_active {
            tracing::warn!(user_id = %user.id, "login rejected: identity is blocked");
            return Err(Error::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn login_admin(&self, payload: LoginPayload) -> Result<LoginResponse<User>> {
        let user = self.authenticate_user(Role::Admin, &payload).await?;
        let identity = RequestIdentity::user(user.id, Role::Admin, None);
        self.respond(identity, user)
    }

    pub async fn login_candidate(
        &self,
        payload: LoginPayload,
    ) -> Result<LoginResponse<CandidateAccount>> {
        let user = self.authenticate_user(Role::Candidate, &payload).await?;
        let profile = self.store.find_profile(user.id).await?;
        let identity = RequestIdentity::user(user.id, Role::Candidate, None);
        self.respond(identity, CandidateAccount { user, profile })
    }

    /// A recruiter without a living membership logs in without an organization.
    pub async fn login_recruiter(
        &self,
        payload: LoginPayload,
    ) -> Result<LoginResponse<RecruiterAccount>> {
        let user = self.authenticate_user(Role::Recruiter, &payload).await?;
        let membership = self.store.find_membership(user.id).await?;
        let identity = RequestIdentity::user(
            user.id,
            Role::Recruiter,
            membership.as_ref().map(|m| m.organization_id),
        );
        self.respond(identity, RecruiterAccount { user, membership })
    }

    pub async fn login_organization(
        &self,
        payload: LoginPayload,
    ) -> Result<LoginResponse<Organization>> {
        let email = payload.email.trim().to_lowercase();
        let org = self
            .store
            .find_organization_by_email(&email)
            .await?
            .ok_or(Error::InvalidCredentials)?;
        if !verify_password(&payload.password, &org.password_hash) {
            tracing::info!(organization_id = %org.id, "login rejected: bad password");
            return Err(Error::InvalidCredentials);
        }
        if !org.is_active {
            tracing::warn!(organization_id = %org.id, "login rejected: organization is blocked");
            return Err(Error::InvalidCredentials);
        }
        self.respond(RequestIdentity::organization(org.id), org)
    }

    fn respond<P>(&self, identity: RequestIdentity, profile: P) -> Result<LoginResponse<P>> {
        Ok(LoginResponse {
            token: self.tokens.issue(&identity)?,
            identity,
            profile,
        })
    }

    pub async fn admin_account(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .filter(|u| u.role == Role::Admin)
            .ok_or_else(|| Error::NotFound("Admin not found".into()))
    }

    pub async fn candidate_account(&self, user_id: Uuid) -> Result<CandidateAccount> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        let profile = self.store.find_profile(user_id).await?;
        Ok(CandidateAccount { user, profile })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        headline: Option<&str>,
        skills: &[String],
    ) -> Result<CandidateProfile> {
        let skills = normalize_skills(skills);
        self.store
            .upsert_profile(user_id, name.trim(), headline, &skills)
            .await
    }
}

/// Trimmed, lowercased, deduplicated, original order kept.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let s = skill.trim().to_lowercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{BlockableStore, MemoryStore};

    fn service() -> (Arc<MemoryStore>, CredentialService, Arc<TokenService>) {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new("test-secret", None));
        (store.clone(), CredentialService::new(store, tokens.clone()), tokens)
    }

    fn candidate_payload(email: &str, mobile: &str) -> RegisterCandidatePayload {
        RegisterCandidatePayload {
            name: "Dana".into(),
            email: email.into(),
            mobile: mobile.into(),
            password: "password123".into(),
            headline: None,
            skills: vec![" Rust ".into(), "rust".into(), "SQL".into()],
        }
    }

    #[tokio::test]
    async fn candidate_registration_and_login() {
        let (_store, creds, tokens) = service();
        let account = creds
            .register_candidate(candidate_payload("Dana@Example.com", "5550001"))
            .await
            .unwrap();
        assert_eq!(account.user.email, "dana@example.com");
        assert_eq!(account.profile.unwrap().skills, vec!["rust", "sql"]);

        let login = creds
            .login_candidate(LoginPayload {
                email: "dana@example.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        let identity = tokens.verify(&login.token).unwrap();
        assert_eq!(identity.subject_id, account.user.id);
        assert_eq!(identity.role, Some(Role::Candidate));
    }

    #[tokio::test]
    async fn duplicate_mobile_is_a_conflict() {
        let (_store, creds, _) = service();
        creds
            .register_candidate(candidate_payload("a@example.com", "5550002"))
            .await
            .unwrap();
        let err = creds
            .register_candidate(candidate_payload("b@example.com", "5550002"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn blocked_identity_cannot_log_in() {
        let (store, creds, _) = service();
        let account = creds
            .register_candidate(candidate_payload("blocked@example.com", "5550003"))
            .await
            .unwrap();
        BlockableStore::<User>::transition_active(
            store.as_ref(),
            account.user.id,
            true,
            false,
        )
        .await
        .unwrap();

        let err = creds
            .login_candidate(LoginPayload {
                email: "blocked@example.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn recruiter_token_carries_membership_organization() {
        let (_store, creds, tokens) = service();
        let org = creds
            .register_organization(RegisterOrganizationPayload {
                name: "Acme".into(),
                email: "hr@acme.io".into(),
                password: "password123".into(),
                website: None,
                description: None,
            })
            .await
            .unwrap();
        creds
            .register_recruiter(
                org.id,
                RegisterRecruiterPayload {
                    organization_id: None,
                    name: "Rae".into(),
                    position: "Talent lead".into(),
                    org_role: None,
                    email: "rae@acme.io".into(),
                    mobile: "5550004".into(),
                    password: "password123".into(),
                },
            )
            .await
            .unwrap();

        let login = creds
            .login_recruiter(LoginPayload {
                email: "rae@acme.io".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        let identity = tokens.verify(&login.token).unwrap();
        assert_eq!(identity.organization_id, Some(org.id));
        assert_eq!(
            login.profile.membership.unwrap().org_role,
            DEFAULT_ORG_ROLE
        );

        let wrong = creds
            .login_organization(LoginPayload {
                email: "hr@acme.io".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, Error::InvalidCredentials));
    }
}
