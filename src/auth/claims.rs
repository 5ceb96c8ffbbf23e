use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use time::OffsetDateTime;

/// The subset of JWT claims the client looks at.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
}

/// Read claims without verifying the signature; the client has no key and
/// only needs the expiry. `None` for opaque (non-JWT) tokens.
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// True only for a JWT whose `exp` lies in the past.
pub fn is_expired(token: &str, now: OffsetDateTime) -> bool {
    peek_claims(token)
        .and_then(|c| c.exp)
        .map(|exp| exp <= now.unix_timestamp())
        .unwrap_or(false)
}
