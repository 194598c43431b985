//! Mashar Observability
//!
//! - Tracing with optional OpenTelemetry export
//! - Prometheus metrics, including game and lesson counters
//! - HTTP request/response logging
//!
//! Compiled in with the `observability` feature (default). At runtime the
//! `OBSERVABILITY_ENABLED` environment variable can switch it off, in which
//! case only console logging is installed.
//!
//! ```no_run
//! use mashar_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware, track_game_started,
    track_game_stopped, track_jwt_issued, track_lesson_registered, track_user_created,
    track_user_login_failure, track_user_login_success, track_vector_attempt,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Console logging only.
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    /// Placeholder for the Prometheus handle.
    #[derive(Clone)]
    pub struct PrometheusHandle;

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn metrics_app(_handle: PrometheusHandle) -> Router {
        Router::new()
    }

    pub fn track_user_created(_role: &str) {}
    pub fn track_user_login_success(_role: &str) {}
    pub fn track_user_login_failure(_reason: &str) {}
    pub fn track_jwt_issued() {}
    pub fn track_game_started(_branch: &str) {}
    pub fn track_game_stopped(_branch: &str) {}
    pub fn track_vector_attempt(_team: &str, _success: bool) {}
    pub fn track_lesson_registered(_branch: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
