//! # Mashar Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed front-end origins
//! - [`rate_limit`]: per-IP limits for public and login endpoints
//! - [`lists`]: page sizes for the paginated lists
//!
//! ```ignore
//! use mashar_config::{CorsConfig, JwtConfig, ListConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let lists = ListConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod lists;
pub mod rate_limit;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use lists::ListConfig;
pub use rate_limit::RateLimitConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
