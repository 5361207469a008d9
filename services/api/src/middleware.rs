//! Authentication middleware
//!
//! Turns a bearer JWT into the [`Principal`] the core authorizes against.
//! Tokens are issued elsewhere; this service only verifies them.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use domain::{Principal, Role};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Platform role (`admin`, `salon_admin`, `customer`, `super_admin`)
    pub role: String,
    /// Salon administered by a `salon_admin`
    #[serde(default)]
    pub salon_id: Option<Uuid>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    pub fn into_principal(self) -> Result<Principal, ApiError> {
        let role = self.role.parse::<Role>().map_err(|e| {
            warn!("Rejected token for {}: {}", self.sub, e);
            ApiError::Unauthorized
        })?;
        Ok(Principal::new(self.sub, role, self.salon_id))
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Public key for verifying tokens
    pub public_key: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PUBLIC_KEY`: Public key (PEM format) or path to the public key file
    pub fn from_env() -> Result<Self, String> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| "JWT_PUBLIC_KEY environment variable not set".to_string())?;

        // If the public key looks like a file path, read from file (try CWD, then project root)
        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| format!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig { public_key })
    }
}

/// Verifies access tokens and extracts the principal
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        Self { key, validation }
    }

    /// RS256 verifier from the configured public key
    pub fn from_config(config: &JwtConfig) -> anyhow::Result<Self> {
        let key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                error!("Failed to validate token: {}", e);
                ApiError::Unauthorized
            })?;
        token_data.claims.into_principal()
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let principal = state.token_verifier.verify(bearer.token())?;

    // Handlers pick the principal up with `Extension<Principal>`
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
