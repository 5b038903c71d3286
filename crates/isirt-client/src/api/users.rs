use bytes::Bytes;
use isirt_schema::{UserCreate, UserCrossReference, UserExportFilters, UserProfile, UserUpdate};
use serde_json::json;

use crate::{ApiError, ApiRequest, IsirtClient};

impl IsirtClient {
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.http.send(ApiRequest::get("/users/")).await
    }

    pub async fn create_user(&self, user: &UserCreate) -> Result<UserProfile, ApiError> {
        self.http.send(ApiRequest::post("/users/").json(user)?).await
    }

    pub async fn update_user(&self, user_id: i64, update: &UserUpdate) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::put(format!("/users/{user_id}")).json(update)?;
        self.http.send(request).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.http
            .send_empty(ApiRequest::delete(format!("/users/{user_id}")))
            .await
    }

    pub async fn activate_user(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.http
            .send(ApiRequest::post(format!("/users/{user_id}/activate")))
            .await
    }

    pub async fn deactivate_user(
        &self,
        user_id: i64,
        reason: Option<&str>,
    ) -> Result<UserProfile, ApiError> {
        let mut request = ApiRequest::post(format!("/users/{user_id}/deactivate"));
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            request = request.json(&json!({ "reason": reason }))?;
        }
        self.http.send(request).await
    }

    pub async fn user_cross_reference(&self, user_id: i64) -> Result<UserCrossReference, ApiError> {
        let request = ApiRequest::get(format!("/audit/users/{user_id}/cross-reference")).no_retry();
        self.http.send(request).await
    }

    /// Raw export file, byte for byte as the server produced it.
    pub async fn export_users(&self, filters: &UserExportFilters) -> Result<Bytes, ApiError> {
        let request = ApiRequest::get("/users/export").query_pairs(filters.to_query());
        self.http.send_bytes(request).await
    }
}
