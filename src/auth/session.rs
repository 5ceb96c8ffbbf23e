use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::auth::claims;
use crate::auth::dto::{AuthResponse, Credentials, Session, SessionEvent};
use crate::auth::services::{is_email_in_use, validate_credentials};
use crate::error::{ClientError, ClientResult};
use crate::profile::dto::UserProfile;
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::transport::{ApiRequest, Transport};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    Register,
}

impl AuthAction {
    fn path(self) -> &'static str {
        match self {
            AuthAction::Login => "/auth/login",
            AuthAction::Register => "/auth/register",
        }
    }
}

/// Sole owner of the auth token and cached user. At most one live session.
///
/// Reads are synchronous. Persistence is best effort: a storage failure is
/// logged and never fails the login or logout that triggered it.
pub struct SessionStore {
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    session: RwLock<Session>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            store,
            session: RwLock::new(Session::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn session(&self) -> Session {
        self.read().clone()
    }

    /// Cached token, without any validation.
    pub fn current_token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Token usable for a bearer call, or `NotAuthenticated` when there is
    /// none or its `exp` claim has passed.
    pub fn authorized_token(&self) -> ClientResult<String> {
        let token = self.current_token().ok_or(ClientError::NotAuthenticated)?;
        if claims::is_expired(&token, OffsetDateTime::now_utc()) {
            debug!("held token is expired");
            return Err(ClientError::NotAuthenticated);
        }
        Ok(token)
    }

    /// Load a previously persisted session.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Session {
        let token = match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "failed to read persisted token");
                None
            }
        };
        let user_email = match token {
            Some(_) => self.cached_user().await.map(|u| u.email),
            None => None,
        };
        let session = Session { token, user_email };
        *self.write() = session.clone();
        debug!(authenticated = session.is_authenticated(), "session restored");
        session
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        self.authenticate(AuthAction::Login, email, password).await
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<Session> {
        self.authenticate(AuthAction::Register, email, password).await
    }

    async fn authenticate(
        &self,
        action: AuthAction,
        email: &str,
        password: &str,
    ) -> ClientResult<Session> {
        let email = email.trim();
        validate_credentials(email, password)?;

        let body = serde_json::to_value(Credentials { email, password })
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let response = self
            .transport
            .send(ApiRequest::post_json(action.path(), body))
            .await?;

        if !response.is_success() {
            let message = response.error_message();
            return Err(match action {
                AuthAction::Login => {
                    warn!(status = response.status, %message, "login rejected");
                    ClientError::AuthRejected
                }
                AuthAction::Register if is_email_in_use(&response) => {
                    warn!(status = response.status, "email already registered");
                    ClientError::EmailInUse
                }
                AuthAction::Register => {
                    warn!(status = response.status, %message, "register failed");
                    ClientError::Backend {
                        status: response.status,
                        body: message,
                    }
                }
            });
        }

        let auth: AuthResponse = response.json()?;
        if auth.token.is_empty() {
            return Err(ClientError::MalformedResponse("empty token".into()));
        }
        let user_email = if auth.user.email.is_empty() {
            email.to_string()
        } else {
            auth.user.email.clone()
        };

        self.persist(TOKEN_KEY, &auth.token).await;
        self.cache_user(&auth.user).await;

        let session = Session {
            token: Some(auth.token),
            user_email: Some(user_email.clone()),
        };
        *self.write() = session.clone();
        info!(email = %user_email, action = ?action, message = ?auth.message, "signed in");
        self.emit(SessionEvent::SignedIn { email: user_email });
        Ok(session)
    }

    /// Never fails; storage errors are logged and swallowed.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.clear().await;
        info!("signed out");
        self.emit(SessionEvent::SignedOut);
    }

    /// Session teardown after the backend rejected the token.
    #[instrument(skip(self))]
    pub async fn force_logout(&self) {
        self.clear().await;
        warn!("token rejected by backend; session cleared");
        self.emit(SessionEvent::ForcedLogout);
    }

    async fn clear(&self) {
        *self.write() = Session::default();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(error = %e, key, "failed to clear persisted value");
            }
        }
    }

    pub async fn cache_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(json) => self.persist(USER_KEY, &json).await,
            Err(e) => warn!(error = %e, "failed to encode user for cache"),
        }
        if !user.email.is_empty() && self.read().token.is_some() {
            self.write().user_email = Some(user.email.clone());
        }
    }

    pub async fn cached_user(&self) -> Option<UserProfile> {
        let raw = match self.store.get(USER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read cached user");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "cached user is unreadable");
                None
            }
        }
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            warn!(error = %e, key, "failed to persist value");
        }
    }
}
