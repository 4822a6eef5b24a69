//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. Expired-token cleanup (drops the session after a backend 401)

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, SessionExpired, clear_current_admin,
    expire_rejected_sessions, set_current_admin,
};
pub use session::create_session_layer;
