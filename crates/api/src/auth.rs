//! Login and registration.

use reqwest::Method;
use tracing::instrument;

use shopfront_core::{AuthSession, LoginRequest, RegisterRequest};

use crate::client::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Exchange credentials for an access token.
    ///
    /// A 401 here means wrong email or password, not an expired session.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self
            .send_item(Method::POST, "/auth/login", None, request)
            .await?;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "User logged in");
        Ok(session)
    }

    /// Create an account. The backend logs the new user in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self
            .send_item(Method::POST, "/auth/register", None, request)
            .await?;
        tracing::info!(user_id = %session.user.id, "User registered");
        Ok(session)
    }
}
