//! Rate limiting for the endpoints that students reach without a token.
//!
//! - `RATE_LIMIT_ENABLED`: `false` disables the limiter (default: true)
//! - `RATE_LIMIT_PUBLIC_PER_SECOND`: token refill interval for public endpoints (default: 1)
//! - `RATE_LIMIT_PUBLIC_BURST_SIZE`: burst for public endpoints (default: 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: token refill interval for login (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: burst for login (default: 5)
//!
//! Keys are taken from `X-Forwarded-For`/`X-Real-IP` first and fall back to
//! the peer address, since the service normally runs behind a proxy.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub public_per_second: u64,
    pub public_burst_size: u32,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_per_second: 1,
            public_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            public_per_second: env_or("RATE_LIMIT_PUBLIC_PER_SECOND", defaults.public_per_second),
            public_burst_size: env_or("RATE_LIMIT_PUBLIC_BURST_SIZE", defaults.public_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// A configuration with limiting switched off, used by tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Limiter for public student endpoints (vector checks, lesson registration).
    ///
    /// Returns `None` when limiting is disabled or the values are rejected by governor.
    #[must_use]
    pub fn public_governor_config(&self) -> Option<IpGovernorConfig> {
        self.build(self.public_per_second, self.public_burst_size)
    }

    /// Stricter limiter for login.
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<IpGovernorConfig> {
        self.build(self.auth_per_second, self.auth_burst_size)
    }

    fn build(&self, per_second: u64, burst_size: u32) -> Option<IpGovernorConfig> {
        if !self.enabled {
            return None;
        }

        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.public_per_second, 1);
        assert_eq!(config.public_burst_size, 30);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled_builds_nothing() {
        let config = RateLimitConfig::disabled();
        assert!(config.public_governor_config().is_none());
        assert!(config.auth_governor_config().is_none());
    }

    #[test]
    fn test_enabled_builds_configs() {
        let config = RateLimitConfig::default();
        assert!(config.public_governor_config().is_some());
        assert!(config.auth_governor_config().is_some());
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let config = RateLimitConfig {
            public_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert!(config.public_governor_config().is_none());
    }
}
