//! Backend health report from `GET /health`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default = "unknown")]
    pub status: String,
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub version: Option<String>,
    /// Anything else the backend reports (database, cache, ...).
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

fn unknown() -> String {
    "unknown".to_string()
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "up" | "healthy" | "pass"
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_keeps_extra_details() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "OK", "database": "up"
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.details["database"], json!("up"));
    }

    #[test]
    fn test_health_without_status_is_not_healthy() {
        let health: HealthStatus = serde_json::from_value(json!({})).unwrap();
        assert!(!health.is_healthy());
    }
}
