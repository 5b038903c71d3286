use anyhow::{anyhow, Result};
use url::Url;

pub const GOOGLE_LOGIN_PATH: &str = "/api/v1/login/google";

/// Browser entry point for the Google sign-in flow.
pub fn google_login_url(origin: &str) -> String {
    format!("{}{GOOGLE_LOGIN_PATH}", origin.trim_end_matches('/'))
}

/// Rejects malformed redirect URIs and any whose origin is not allow-listed.
pub fn validate_redirect_uri(uri: &str, allowed_origins: &[String]) -> Result<Url> {
    let parsed = Url::parse(uri).map_err(|e| anyhow!("invalid redirect uri {uri}: {e}"))?;
    let origin = parsed.origin().ascii_serialization();
    let allowed = allowed_origins
        .iter()
        .any(|candidate| candidate.trim_end_matches('/') == origin);
    if !allowed {
        anyhow::bail!("redirect uri origin {origin} is not allowed");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_joins_without_double_slash() {
        assert_eq!(
            google_login_url("https://isirt.example.com/"),
            "https://isirt.example.com/api/v1/login/google"
        );
    }

    #[test]
    fn redirect_uri_must_match_allowed_origin() {
        let allowed = vec!["https://isirt.example.com".to_string()];
        assert!(validate_redirect_uri("https://isirt.example.com/auth/callback", &allowed).is_ok());
        assert!(validate_redirect_uri("https://evil.example.com/auth/callback", &allowed).is_err());
        assert!(validate_redirect_uri("not a url", &allowed).is_err());
    }
}
