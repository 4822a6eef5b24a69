//! Admin-only collections. Every call needs an admin bearer token.

use secrecy::SecretString;
use tracing::instrument;

use shopfront_core::{Customer, DashboardAnalytics, Order};

use crate::client::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    #[instrument(skip_all)]
    pub async fn admin_customers(&self, token: &SecretString) -> Result<Vec<Customer>, ApiError> {
        self.get_list("/users/admin/all", Some(token)).await
    }

    #[instrument(skip_all)]
    pub async fn admin_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.get_list("/orders/admin/all", Some(token)).await
    }

    #[instrument(skip_all)]
    pub async fn dashboard_analytics(
        &self,
        token: &SecretString,
    ) -> Result<DashboardAnalytics, ApiError> {
        self.get_item("/analytics/dashboard", Some(token)).await
    }
}
