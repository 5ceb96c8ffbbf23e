use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::session::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};

const UNAUTHORIZED: u16 = 401;

/// Bearer-authenticated access to the backend.
///
/// Every authenticated call goes through `send_authorized`, which is where
/// a 401 turns into a forced logout.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Fails with `NotAuthenticated` before any network traffic when no
    /// usable token is held.
    pub async fn send_authorized(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let token = self.session.authorized_token()?;
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.transport.send(request.with_bearer(token)).await?;

        if response.status == UNAUTHORIZED {
            warn!(%method, %path, "backend rejected token");
            self.session.force_logout().await;
            return Err(ClientError::AuthRejected);
        }
        if !response.is_success() {
            warn!(%method, %path, status = response.status, "backend error");
            return Err(ClientError::Backend {
                status: response.status,
                body: response.body,
            });
        }
        debug!(%method, %path, status = response.status, "ok");
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_authorized(ApiRequest::get(path)).await?.json()
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ClientResult<T> {
        self.send_authorized(ApiRequest::put_json(path, body))
            .await?
            .json()
    }
}
