//! Authentication route handlers.
//!
//! Credentials go straight to the backend; on success the returned user is
//! kept in the session. The backend token itself is discarded.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::{AuthSession, Email, LoginRequest, RegisterRequest};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::PageContext;
use crate::state::AppState;

/// Shortest password the registration form accepts.
const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterForm {
    /// Check the form, returning one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if let Err(e) = Email::parse(&self.email) {
            errors.push(format!("Invalid email: {e}"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
        if self.password != self.password_confirm {
            errors.push("Passwords do not match".to_string());
        }
        errors
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign the shopper in and head to their account.
async fn start_session(session: &Session, auth: &AuthSession) -> Result<Redirect> {
    let user = CurrentUser::from(&auth.user);
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    tracing::info!(user_id = %user.id, "Shopper signed in");
    flash::success(session, format!("Welcome, {}!", user.display_name())).await;
    Ok(Redirect::to("/account"))
}

/// Display the login page.
#[instrument(skip(state, session, user))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        ctx: PageContext::load(&state, &session).await,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = Email::normalize_or_trim(&form.email);
    let request = LoginRequest {
        email: email.clone(),
        password: form.password,
    };

    match state.api().login(&request).await {
        Ok(auth) => Ok(start_session(&session, &auth).await?.into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                ctx: PageContext::load(&state, &session).await,
                error: Some(e.user_message()),
                email,
            }
            .into_response())
        }
    }
}

/// Display the registration page.
#[instrument(skip(state, session, user))]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    RegisterTemplate {
        ctx: PageContext::load(&state, &session).await,
        errors: Vec::new(),
        name: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A successful registration signs the new shopper in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let errors = form.validate();
    let name = form.name.trim().to_string();
    let email = Email::normalize_or_trim(&form.email);

    if !errors.is_empty() {
        return Ok(RegisterTemplate {
            ctx: PageContext::load(&state, &session).await,
            errors,
            name,
            email,
        }
        .into_response());
    }

    let request = RegisterRequest {
        name: name.clone(),
        email: email.clone(),
        password: form.password,
    };

    match state.api().register(&request).await {
        Ok(auth) => Ok(start_session(&session, &auth).await?.into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            Ok(RegisterTemplate {
                ctx: PageContext::load(&state, &session).await,
                errors: vec![e.user_message()],
                name,
                email,
            }
            .into_response())
        }
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    flash::info(&session, "You have been signed out").await;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn test_register_form_valid() {
        assert!(form("correct horse", "correct horse").validate().is_empty());
    }

    #[test]
    fn test_register_form_short_password() {
        let errors = form("short", "short").validate();
        assert_eq!(errors, vec!["Password must be at least 8 characters"]);
    }

    #[test]
    fn test_register_form_bad_email() {
        let mut form = form("correct horse", "correct horse");
        form.email = "ada@localhost".to_string();
        assert_eq!(
            form.validate(),
            vec!["Invalid email: must look like name@example.com"]
        );
    }

    #[test]
    fn test_register_form_mismatch_and_blank_name() {
        let mut form = form("correct horse", "battery staple");
        form.name = "  ".to_string();
        let errors = form.validate();
        assert_eq!(errors, vec!["Name is required", "Passwords do not match"]);
    }
}
