/// Hook the HTTP wrapper uses to send the user back to the login route
/// when a call fails with 401.
pub trait AuthRedirect: Send + Sync {
    /// Route the caller currently considers active.
    fn current_route(&self) -> String;

    fn redirect_to_login(&self, login_route: &str);
}

pub(crate) fn should_redirect(current_route: &str, login_route: &str) -> bool {
    let login_route = login_route.trim_end_matches('/');
    if login_route.is_empty() {
        return false;
    }
    match current_route.strip_prefix(login_route) {
        Some(rest) => !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::should_redirect;

    #[test]
    fn skips_when_already_on_login() {
        assert!(!should_redirect("/login", "/login"));
        assert!(!should_redirect("/login/callback", "/login"));
        assert!(!should_redirect("/login?next=/incidents", "/login/"));
    }

    #[test]
    fn redirects_from_other_routes() {
        assert!(should_redirect("/incidents/4", "/login"));
        assert!(should_redirect("/loginhelp", "/login"));
        assert!(should_redirect("", "/login"));
    }
}
