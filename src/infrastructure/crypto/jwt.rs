//! JWT verification
//!
//! Tokens are issued by an external identity provider; this service only
//! checks the signature, expiry and issuer and turns the claims into an
//! [`Actor`].

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::Actor;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
    /// Expected `iss` claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "super-secret-key-change-in-production".to_string(),
            issuer: "car-rental".to_string(),
        }
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (account email)
    pub sub: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Profile photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn into_actor(self) -> Actor {
        Actor {
            email: self.sub,
            name: self.name,
            photo_url: self.picture,
        }
    }
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Signs tokens the way the identity provider does; used by tests only.
#[cfg(test)]
pub(crate) fn sign_token(email: &str, config: &JwtConfig, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        sub: email.to_string(),
        name: Some("Test User".to_string()),
        picture: None,
        exp: now + ttl_secs,
        iat: now,
        iss: config.issuer.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_token_yields_actor() {
        let config = JwtConfig::default();
        let token = sign_token("a@x.com", &config, 3600);
        let actor = verify_token(&token, &config).unwrap().into_actor();
        assert_eq!(actor.email, "a@x.com");
        assert_eq!(actor.name.as_deref(), Some("Test User"));
        assert!(actor.photo_url.is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig::default();
        let token = sign_token("a@x.com", &config, -3600);
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let issuer = JwtConfig {
            issuer: "someone-else".into(),
            ..JwtConfig::default()
        };
        let token = sign_token("a@x.com", &issuer, 3600);
        assert!(verify_token(&token, &JwtConfig::default()).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        let token = sign_token("a@x.com", &other, 3600);
        assert!(verify_token(&token, &JwtConfig::default()).is_err());
    }
}
