//! Owner of the authenticated session. There is exactly one writer (the
//! holder); any number of readers observe the same value through
//! `watch` receivers.

use std::sync::atomic::{AtomicBool, Ordering};

use isirt_client::{ApiError, IsirtClient};
use isirt_schema::User;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current_user: Option<User>,
    /// True until the first session check finishes.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_user: None,
            loading: true,
        }
    }
}

/// What a protected view should do with the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteGuard {
    Waiting,
    RedirectToLogin,
    Allow(User),
}

impl RouteGuard {
    pub fn from_state(state: &SessionState) -> Self {
        match (&state.current_user, state.loading) {
            (_, true) => Self::Waiting,
            (None, false) => Self::RedirectToLogin,
            (Some(user), false) => Self::Allow(user.clone()),
        }
    }
}

pub struct SessionHolder {
    client: IsirtClient,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl SessionHolder {
    pub fn new(client: IsirtClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            client,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &IsirtClient {
        &self.client
    }

    /// Probes the backend for an existing session. Runs once per holder;
    /// later calls return immediately. Never fails: a missing or broken
    /// session just leaves the user signed out.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let user = match self.client.current_user().await {
            Ok(profile) => {
                let user = User::from(profile);
                tracing::info!("session restored for {}", user.username);
                Some(user)
            }
            Err(err) if err.is_auth() => {
                tracing::debug!("no active session");
                None
            }
            Err(err) => {
                tracing::warn!("session check failed: {err}");
                None
            }
        };

        self.state.send_replace(SessionState {
            current_user: user,
            loading: false,
        });
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        self.client.login(username, password).await?;
        let user = User::from(self.client.current_user().await?);

        self.initialized.store(true, Ordering::SeqCst);
        self.state.send_replace(SessionState {
            current_user: Some(user.clone()),
            loading: false,
        });
        tracing::info!("signed in as {}", user.username);
        Ok(user)
    }

    /// Best effort on the backend; the local session is cleared regardless.
    pub async fn logout(&self) {
        if let Err(err) = self.client.logout().await {
            tracing::warn!("logout request failed: {err}");
        }
        self.state.send_replace(SessionState {
            current_user: None,
            loading: false,
        });
        tracing::info!("signed out");
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::from_state(&self.state.borrow())
    }

    /// Runs the session check if nobody has yet, waits for it to finish,
    /// then evaluates the guard.
    pub async fn guard_when_ready(&self) -> RouteGuard {
        self.initialize().await;
        let mut receiver = self.subscribe();
        let guard = match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => RouteGuard::from_state(&state),
            Err(_) => self.guard(),
        };
        guard
    }
}
