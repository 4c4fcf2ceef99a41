//! Authentication middleware for JWT token validation
//!
//! Tokens are issued by the authentication service; this service only
//! verifies them. The `sub` claim is the id of the movie owner.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// PEM encoded RSA public key
    pub public_key: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// `JWT_PUBLIC_KEY` holds either the PEM itself or a path to it.
    pub fn from_env() -> Result<Self, String> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| "JWT_PUBLIC_KEY environment variable not set".to_string())?;

        let public_key = if public_key.trim_start().starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .map_err(|e| format!("Failed to read public key file {}: {}", public_key, e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig { public_key })
    }

    pub fn decoding_key(&self) -> Result<DecodingKey, String> {
        DecodingKey::from_rsa_pem(self.public_key.as_bytes())
            .map_err(|e| format!("Failed to create decoding key: {}", e))
    }
}

/// Verify an RS256 access token and return its subject.
pub fn verify_token(token: &str, key: &DecodingKey) -> Result<AuthUser, ApiError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;

    let token_data = jsonwebtoken::decode::<Claims>(token, key, &validation).map_err(|e| {
        debug!("Rejected access token: {}", e);
        ApiError::Unauthorized
    })?;

    Ok(AuthUser {
        id: token_data.claims.sub,
    })
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ApiError::Unauthorized);
    };

    let user = verify_token(bearer.token(), &state.decoding_key)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Fail startup early when the key cannot be used.
pub fn load_decoding_key() -> Result<DecodingKey, String> {
    let config = JwtConfig::from_env()?;
    config.decoding_key().inspect_err(|e| error!("{}", e))
}
