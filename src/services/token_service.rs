use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::RequestIdentity;
use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Token Authority: stateless HS256 identity assertions.
///
/// Verification checks the signature, the claim shape and `exp` when one is
/// present. It never consults storage.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: Option<i64>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: Option<i64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn issue(&self, identity: &RequestIdentity) -> Result<String> {
        let exp = self.ttl_seconds.map(|ttl| Utc::now().timestamp() + ttl);
        self.issue_with_expiry(identity, exp)
    }

    /// Issues a token with an explicit not-after timestamp (seconds since epoch).
    pub fn issue_with_expiry(&self, identity: &RequestIdentity, exp: Option<i64>) -> Result<String> {
        let claims = Claims {
            sub: identity.subject_id,
            role: identity.role,
            organization_id: identity.organization_id,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<RequestIdentity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            Error::InvalidToken
        })?;
        Ok(RequestIdentity {
            subject_id: data.claims.sub,
            role: data.claims.role,
            organization_id: data.claims.organization_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_claims_round_trip_through_verify() {
        let tokens = TokenService::new("secret", None);
        let org_id = Uuid::new_v4();
        let identity = RequestIdentity::user(Uuid::new_v4(), Role::Recruiter, Some(org_id));

        let verified = tokens.verify(&tokens.issue(&identity).unwrap()).unwrap();
        assert_eq!(verified, identity);

        let org = RequestIdentity::organization(org_id);
        let verified = tokens.verify(&tokens.issue(&org).unwrap()).unwrap();
        assert_eq!(verified.role, None);
        assert_eq!(verified.organization_id, Some(org_id));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = TokenService::new("ours", None);
        let theirs = TokenService::new("theirs", None);
        let token = theirs
            .issue(&RequestIdentity::user(Uuid::new_v4(), Role::Admin, None))
            .unwrap();
        assert!(matches!(ours.verify(&token), Err(Error::InvalidToken)));
        assert!(matches!(ours.verify("not.a.jwt"), Err(Error::InvalidToken)));
    }

    #[test]
    fn expired_tokens_are_rejected_and_live_ones_accepted() {
        let tokens = TokenService::new("secret", Some(3600));
        let identity = RequestIdentity::user(Uuid::new_v4(), Role::Candidate, None);

        assert!(tokens.verify(&tokens.issue(&identity).unwrap()).is_ok());

        let past = Utc::now().timestamp() - 3600;
        let stale = tokens.issue_with_expiry(&identity, Some(past)).unwrap();
        assert!(matches!(tokens.verify(&stale), Err(Error::InvalidToken)));
    }
}
