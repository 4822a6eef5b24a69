//! Backend reachability probes for the admin diagnostics page.

use std::time::Instant;

use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;

use shopfront_core::HealthStatus;

use crate::client::ApiClient;
use crate::error::ApiError;

/// A read-only endpoint worth probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticEndpoint {
    pub name: &'static str,
    pub path: &'static str,
    /// Whether the probe should carry the admin token.
    pub requires_auth: bool,
}

/// Every GET endpoint the dashboards depend on. Mutating endpoints are
/// never probed.
#[must_use]
pub const fn diagnostics_endpoints() -> &'static [DiagnosticEndpoint] {
    &[
        DiagnosticEndpoint {
            name: "Health",
            path: "/health",
            requires_auth: false,
        },
        DiagnosticEndpoint {
            name: "Products",
            path: "/products",
            requires_auth: false,
        },
        DiagnosticEndpoint {
            name: "Categories",
            path: "/categories",
            requires_auth: false,
        },
        DiagnosticEndpoint {
            name: "Customers",
            path: "/users/admin/all",
            requires_auth: true,
        },
        DiagnosticEndpoint {
            name: "Orders",
            path: "/orders/admin/all",
            requires_auth: true,
        },
        DiagnosticEndpoint {
            name: "Analytics",
            path: "/analytics/dashboard",
            requires_auth: true,
        },
    ]
}

/// How a probe went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx.
    Healthy,
    /// 4xx; the endpoint answered but rejected the probe.
    Degraded,
    /// 5xx.
    Failing,
    /// No HTTP response at all.
    Unreachable,
}

impl ProbeOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Degraded => "Degraded",
            Self::Failing => "Failing",
            Self::Unreachable => "Unreachable",
        }
    }

    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Healthy => "badge-success",
            Self::Degraded => "badge-warning",
            Self::Failing | Self::Unreachable => "badge-danger",
        }
    }
}

/// Result of probing one endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub endpoint: DiagnosticEndpoint,
    pub url: String,
    pub outcome: ProbeOutcome,
    pub status: Option<u16>,
    pub latency_ms: u64,
    /// Error text or a short excerpt of the response.
    pub detail: Option<String>,
}

impl ApiClient {
    /// Probe a single endpoint with a GET.
    ///
    /// Never fails: transport errors are reported as
    /// [`ProbeOutcome::Unreachable`].
    #[instrument(skip(self, token), fields(path = endpoint.path))]
    pub async fn probe(
        &self,
        endpoint: DiagnosticEndpoint,
        token: Option<&SecretString>,
    ) -> ProbeResult {
        let url = self
            .url(endpoint.path)
            .map_or_else(|_| endpoint.path.to_string(), |u| u.to_string());
        let token = if endpoint.requires_auth { token } else { None };

        let started = Instant::now();
        let response = match self.request(Method::GET, endpoint.path, token) {
            Ok(request) => request.send().await.map_err(ApiError::from),
            Err(e) => Err(e),
        };

        let (outcome, status, detail) = match response {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let outcome = if status.is_success() {
                    ProbeOutcome::Healthy
                } else if status.is_client_error() {
                    ProbeOutcome::Degraded
                } else {
                    ProbeOutcome::Failing
                };
                let detail = (!status.is_success())
                    .then(|| crate::error::extract_message(&body))
                    .flatten();
                (outcome, Some(status.as_u16()), detail)
            }
            Err(e) => (ProbeOutcome::Unreachable, None, Some(e.to_string())),
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(?outcome, ?status, latency_ms, "Probe finished");

        ProbeResult {
            endpoint,
            url,
            outcome,
            status,
            latency_ms,
            detail,
        }
    }

    /// Fetch and decode `/health`.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let request = self.request(Method::GET, "/health", None)?;
        self.send_json(request, "/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_unique_reads() {
        let endpoints = diagnostics_endpoints();
        let mut paths: Vec<_> = endpoints.iter().map(|e| e.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), endpoints.len());
        assert!(endpoints.iter().any(|e| e.path == "/health" && !e.requires_auth));
        assert!(
            endpoints
                .iter()
                .filter(|e| e.path.contains("/admin/"))
                .all(|e| e.requires_auth)
        );
    }

    #[test]
    fn test_outcome_badges() {
        assert_eq!(ProbeOutcome::Healthy.badge_class(), "badge-success");
        assert_eq!(ProbeOutcome::Unreachable.label(), "Unreachable");
    }
}
