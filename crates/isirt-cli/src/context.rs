use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use isirt_auth::{SessionStore, StoredSession};
use isirt_client::IsirtClient;
use isirt_core::{load_config, IsirtConfig, RouteGuard, RouteTracker, SessionHolder};
use isirt_schema::User;

/// Everything one CLI invocation needs: config, the persisted cookie, and
/// the session holder wired to a route tracker.
pub struct AppContext {
    pub config: IsirtConfig,
    pub session: SessionHolder,
    pub tracker: Arc<RouteTracker>,
    pub store: SessionStore,
    pub json: bool,
}

impl AppContext {
    pub fn build(config_root: &Path, api_url: Option<&str>, route: &str, json: bool) -> Result<Self> {
        let mut config = load_config(config_root)?;
        config.apply_api_url_override(api_url);
        config.validate()?;

        let tracker = Arc::new(RouteTracker::new(route));
        let client = IsirtClient::new(config.client_options())
            .context("failed to build http client")?
            .with_redirect(tracker.clone());

        let store = SessionStore::from_config_dir(config_root);
        if let Some(saved) = store.session_for(&client.origin())? {
            tracing::debug!("restoring saved session for {}", client.origin());
            client.restore_session_cookie(saved.cookie_pairs());
        }

        Ok(Self {
            config,
            session: SessionHolder::new(client),
            tracker,
            store,
            json,
        })
    }

    pub fn client(&self) -> &IsirtClient {
        self.session.client()
    }

    pub fn origin(&self) -> String {
        self.client().origin()
    }

    /// Runs the route guard; protected commands stop here when signed out.
    pub async fn require_user(&self) -> Result<User> {
        match self.session.guard_when_ready().await {
            RouteGuard::Allow(user) => Ok(user),
            RouteGuard::RedirectToLogin => {
                self.tracker.navigate(self.config.login_route.clone());
                if self.forget_session()? {
                    tracing::info!("dropped stale session for {}", self.origin());
                }
                Err(anyhow!("not signed in to {}; run `isirt login` first", self.origin()))
            }
            RouteGuard::Waiting => Err(anyhow!("session check did not finish")),
        }
    }

    pub fn persist_session(&self, user: &User) -> Result<()> {
        let Some(cookie) = self.client().session_cookie() else {
            tracing::warn!("backend did not set a session cookie; nothing persisted");
            return Ok(());
        };
        self.store.save_session(
            self.origin(),
            StoredSession {
                cookie,
                username: Some(user.username.clone()),
                saved_at: Utc::now().timestamp(),
            },
        )
    }

    pub fn forget_session(&self) -> Result<bool> {
        self.store.clear_session(&self.origin())
    }

    /// Drops the stored cookie when a call was bounced to the login route.
    pub fn finish(&self) -> Result<()> {
        if self.tracker.redirect_count() > 0 {
            self.forget_session()?;
            eprintln!("Session expired. Run `isirt login` to sign in again.");
        }
        Ok(())
    }
}
