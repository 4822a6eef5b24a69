//! Backend diagnostics page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use futures::future::join_all;
use shopfront_api::{ProbeOutcome, ProbeResult, diagnostics_endpoints};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::AdminPage;
use crate::state::AppState;

/// Probe row for the diagnostics table.
#[derive(Debug, Clone)]
pub struct ProbeView {
    pub name: &'static str,
    pub url: String,
    pub requires_auth: bool,
    pub outcome: &'static str,
    pub badge_class: &'static str,
    pub status: String,
    pub latency_ms: u64,
    pub detail: String,
}

impl From<&ProbeResult> for ProbeView {
    fn from(result: &ProbeResult) -> Self {
        Self {
            name: result.endpoint.name,
            url: result.url.clone(),
            requires_auth: result.endpoint.requires_auth,
            outcome: result.outcome.label(),
            badge_class: result.outcome.badge_class(),
            status: result
                .status
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            latency_ms: result.latency_ms,
            detail: result.detail.clone().unwrap_or_default(),
        }
    }
}

/// Diagnostics template.
#[derive(Template, WebTemplate)]
#[template(path = "diagnostics.html")]
pub struct DiagnosticsTemplate {
    pub page: AdminPage,
    pub base_url: String,
    pub probes: Vec<ProbeView>,
    pub healthy: usize,
    pub total: usize,
}

/// Probe every read endpoint at once and show the results.
///
/// GET /diagnostics
#[instrument(skip(admin, state, session), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    let token = admin.token();
    let results = join_all(
        diagnostics_endpoints()
            .iter()
            .map(|endpoint| state.api().probe(*endpoint, Some(&token))),
    )
    .await;

    let healthy = results
        .iter()
        .filter(|r| r.outcome == ProbeOutcome::Healthy)
        .count();
    tracing::info!(healthy, total = results.len(), "Diagnostics probes finished");

    DiagnosticsTemplate {
        page: AdminPage::load(&admin, &session, "/diagnostics").await,
        base_url: state.api().base_url().to_string(),
        probes: results.iter().map(ProbeView::from).collect(),
        healthy,
        total: results.len(),
    }
}
