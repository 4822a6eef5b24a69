//! Theme editor route handlers.
//!
//! Saving writes the theme file the storefront watches; the storefront picks
//! up the change on its next stylesheet request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::{ThemeConfig, ThemeError, ThemeStylesheet};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::routes::AdminPage;
use crate::state::AppState;
use crate::theme::{self, ThemeFileError};

/// One editable token.
#[derive(Debug, Clone)]
pub struct ThemeField {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub is_color: bool,
    pub error: Option<String>,
}

/// Preset swatch shown beside the editor.
#[derive(Debug, Clone)]
pub struct PresetView {
    pub name: &'static str,
    pub primary: String,
    pub accent: String,
    pub background: String,
}

fn theme_fields(config: &ThemeConfig, errors: &[ThemeError]) -> Vec<ThemeField> {
    let error_for = |name: &str| {
        errors
            .iter()
            .find(|e| e.field() == name)
            .map(ToString::to_string)
    };
    let field = |name: &'static str, label: &'static str, value: &str, is_color: bool| ThemeField {
        name,
        label,
        value: value.to_string(),
        is_color,
        error: error_for(name),
    };

    vec![
        field("primary_color", "Primary", &config.primary_color, true),
        field("secondary_color", "Secondary", &config.secondary_color, true),
        field("accent_color", "Accent", &config.accent_color, true),
        field("background_color", "Background", &config.background_color, true),
        field("surface_color", "Surface", &config.surface_color, true),
        field("text_color", "Text", &config.text_color, true),
        field("muted_color", "Muted text", &config.muted_color, true),
        field("font_family", "Body font", &config.font_family, false),
        field("heading_font_family", "Heading font", &config.heading_font_family, false),
        field("base_font_size", "Base font size", &config.base_font_size, false),
        field("border_radius", "Corner radius", &config.border_radius, false),
    ]
}

fn presets() -> Vec<PresetView> {
    ThemeConfig::presets()
        .into_iter()
        .map(|(name, preset)| PresetView {
            name,
            primary: preset.primary_color,
            accent: preset.accent_color,
            background: preset.background_color,
        })
        .collect()
}

/// Theme editor template.
#[derive(Template, WebTemplate)]
#[template(path = "theme/edit.html")]
pub struct ThemeEditTemplate {
    pub page: AdminPage,
    pub fields: Vec<ThemeField>,
    pub presets: Vec<PresetView>,
    /// Problem with the saved file, shown above the form.
    pub error: Option<String>,
    pub theme_path: String,
}

async fn render_editor(
    state: &AppState,
    admin: &CurrentAdmin,
    session: &Session,
    config: &ThemeConfig,
    errors: &[ThemeError],
    error: Option<String>,
) -> Response {
    ThemeEditTemplate {
        page: AdminPage::load(admin, session, "/theme").await,
        fields: theme_fields(config, errors),
        presets: presets(),
        error,
        theme_path: state.theme_path().display().to_string(),
    }
    .into_response()
}

/// Theme editor page.
///
/// GET /theme
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let (config, error) = match theme::load(state.theme_path()).await {
        Ok(config) => (config, None),
        Err(e) => {
            tracing::warn!(error = %e, "Saved theme could not be read, showing defaults");
            (
                ThemeConfig::default(),
                Some(format!("The saved theme could not be read ({e}). Saving will replace it.")),
            )
        }
    };

    render_editor(&state, &admin, &session, &config, &[], error).await
}

/// Save the theme.
///
/// POST /theme
#[instrument(skip(admin, state, session, config), fields(admin_id = %admin.id))]
pub async fn save(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(config): Form<ThemeConfig>,
) -> Result<Response> {
    match theme::save(state.theme_path(), &config).await {
        Ok(()) => {
            flash::success(&session, "Theme saved").await;
            Ok(Redirect::to("/theme").into_response())
        }
        Err(ThemeFileError::Invalid(errors)) => {
            Ok(render_editor(&state, &admin, &session, &config, &errors, None).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Reset form data.
#[derive(Debug, Default, Deserialize)]
pub struct ResetForm {
    pub preset: Option<String>,
}

/// Replace the theme with a preset, or the default theme.
///
/// POST /theme/reset
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn reset(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetForm>,
) -> Result<Redirect> {
    let name = form
        .preset
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Default");

    let Some(config) = ThemeConfig::preset(name) else {
        flash::error(&session, format!("Unknown preset \"{name}\"")).await;
        return Ok(Redirect::to("/theme"));
    };

    theme::save(state.theme_path(), &config).await?;
    flash::success(&session, format!("Theme reset to {name}")).await;
    Ok(Redirect::to("/theme"))
}

/// Stylesheet for the tokens in the query string, or the saved theme when
/// there is no query. Lets the editor preview before saving.
///
/// GET /theme/preview.css
#[instrument(skip_all)]
pub async fn preview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(submitted): Query<ThemeConfig>,
) -> Result<Response> {
    let config = if raw.is_some_and(|q| !q.is_empty()) {
        submitted
    } else {
        theme::load(state.theme_path()).await?
    };

    if let Err(errors) = config.validate() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, message).into_response());
    }

    let stylesheet = ThemeStylesheet::render(&config);
    Ok((
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        stylesheet.css().to_string(),
    )
        .into_response())
}
