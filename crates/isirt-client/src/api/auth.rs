use isirt_schema::UserProfile;
use serde_json::json;

use crate::{ApiError, ApiRequest, IsirtClient};

impl IsirtClient {
    /// Exchanges credentials for the session cookie, which lands in the jar.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post("/login/token").form(vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]);
        self.http.send_empty(request).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.http.send_empty(ApiRequest::post("/login/logout")).await
    }

    /// Session probe: a 401 here means "not signed in", so it is never
    /// retried and never triggers the login redirect.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::get("/me/").no_retry().no_auth_redirect();
        self.http.send(request).await
    }

    pub async fn exchange_google_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<UserProfile, ApiError> {
        if code.trim().is_empty() || redirect_uri.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "authorization code and redirect uri are required".to_string(),
            ));
        }
        let request = ApiRequest::post("/login/google/exchange-code")
            .json(&json!({ "code": code, "redirect_uri": redirect_uri }))?;
        self.http.send(request).await
    }
}
