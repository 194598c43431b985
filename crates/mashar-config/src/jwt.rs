use std::env;

use crate::env_or;

/// Token settings. Mashar issues a single access token per login; there is
/// no refresh flow.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime in seconds
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "mashar-secret-change-in-production".to_string()),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", 43200), // 12 hours
        }
    }
}
