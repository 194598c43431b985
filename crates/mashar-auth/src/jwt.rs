//! Token creation and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use mashar_config::JwtConfig;
use mashar_core::AppError;

use crate::claims::{Claims, Role};

/// Identity embedded in an access token.
pub struct TokenSubject<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub role: Role,
    pub branch: &'a str,
}

pub fn create_access_token(
    subject: &TokenSubject<'_>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: subject.username.to_string(),
        name: subject.name.to_string(),
        email: subject.email.to_string(),
        role: subject.role,
        branch: subject.branch.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            username: "admin@school.org",
            name: "Admin",
            email: "admin@school.org",
            role: Role::Admin,
            branch: "hfa",
        }
    }

    #[test]
    fn test_create_and_verify() {
        let token = create_access_token(&subject(), &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, "admin@school.org");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.branch, "hfa");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_access_token(&subject(), &config()).unwrap();
        let other = JwtConfig {
            secret: "other".to_string(),
            access_token_expiry: 3600,
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "x@y.z".to_string(),
            name: "X".to_string(),
            email: "x@y.z".to_string(),
            role: Role::Teacher,
            branch: "hfa".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(verify_token("not.a.token", &config()).is_err());
    }
}
