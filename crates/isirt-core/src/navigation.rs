use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use isirt_client::AuthRedirect;

/// Keeps the caller's notion of the active route and counts forced trips to
/// the login route.
#[derive(Debug, Default)]
pub struct RouteTracker {
    route: RwLock<String>,
    redirects: AtomicUsize,
}

impl RouteTracker {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: RwLock::new(route.into()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn navigate(&self, route: impl Into<String>) {
        let route = route.into();
        match self.route.write() {
            Ok(mut current) => *current = route,
            Err(poisoned) => *poisoned.into_inner() = route,
        }
    }

    pub fn route(&self) -> String {
        match self.route.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl AuthRedirect for RouteTracker {
    fn current_route(&self) -> String {
        self.route()
    }

    fn redirect_to_login(&self, login_route: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        tracing::info!("navigating to {login_route}");
        self.navigate(login_route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_moves_to_login_and_counts() {
        let tracker = RouteTracker::new("/incidents");
        assert_eq!(tracker.current_route(), "/incidents");

        tracker.redirect_to_login("/login");
        assert_eq!(tracker.route(), "/login");
        assert_eq!(tracker.redirect_count(), 1);
    }

    #[test]
    fn navigate_does_not_count_as_redirect() {
        let tracker = RouteTracker::default();
        tracker.navigate("/users");
        assert_eq!(tracker.route(), "/users");
        assert_eq!(tracker.redirect_count(), 0);
    }
}
