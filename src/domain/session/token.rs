use super::AuthError;
use crate::domain::identity::Identity;
use crate::infrastructure::graphql::GraphqlSession;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String, // Identity ID
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(rename = "cognito:username", default)]
    pub username: Option<String>,
}

/// Read the claims of an ID token without verifying its signature.
/// The backend verifies tokens; here we only need the subject and expiry.
pub fn inspect_id_token(token: &str) -> Result<IdTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Build a session for `identity` from a freshly issued ID token.
/// Rejects tokens issued for a different subject.
pub fn bind_session(
    endpoint: &str,
    identity: &Identity,
    id_token: &str,
) -> Result<GraphqlSession, AuthError> {
    let claims = inspect_id_token(id_token)?;
    if claims.sub != identity.id {
        return Err(AuthError::SubjectMismatch {
            expected: identity.id.clone(),
            actual: claims.sub,
        });
    }

    let mut session = GraphqlSession::new(endpoint, &identity.id, id_token);
    if let Some(expires_at) = claims.exp.and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)) {
        session = session.with_expiry(expires_at);
    }

    Ok(session)
}
