//! Authentication route handlers for admin.
//!
//! Admins sign in with their backend credentials. Only users whose backend
//! role is admin get a session; everyone else is turned away at the form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::LoginRequest;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{self, Flash};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Shown when a non-admin account signs in successfully.
pub const NOT_ADMIN_MESSAGE: &str = "This account does not have admin access";

const EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Login page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub expired: Option<String>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<Flash>,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
    pub email: String,
}

/// Render the login page.
///
/// GET /auth/login
pub async fn login_page(
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        flashes: flash::take(&session).await,
        notice: query.expired.is_some().then_some(EXPIRED_MESSAGE),
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Check credentials with the backend and start an admin session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let rejected = |error: String| LoginTemplate {
        flashes: Vec::new(),
        notice: None,
        error: Some(error),
        email: email.clone(),
    };

    if email.is_empty() || form.password.is_empty() {
        return Ok(rejected("Email and password are required".to_string()).into_response());
    }

    let request = LoginRequest {
        email: email.clone(),
        password: form.password,
    };
    let auth = match state.api().login(&request).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::info!(error = %e, "Admin login rejected by backend");
            return Ok(rejected(e.user_message()).into_response());
        }
    };

    if !auth.user.is_admin() {
        tracing::warn!(user_id = %auth.user.id, "Non-admin account tried to sign in");
        return Ok(rejected(NOT_ADMIN_MESSAGE.to_string()).into_response());
    }

    let admin = CurrentAdmin::from(auth);
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(&admin.email));
    tracing::info!(admin_id = %admin.id, "Admin signed in");

    flash::success(&session, format!("Signed in as {}", admin.display_name())).await;
    Ok(Redirect::to("/").into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    flash::success(&session, "Signed out").await;
    Ok(Redirect::to("/auth/login"))
}
