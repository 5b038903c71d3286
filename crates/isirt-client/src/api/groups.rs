use isirt_schema::{Group, GroupCreate, GroupUpdate};

use crate::{ApiError, ApiRequest, IsirtClient};

impl IsirtClient {
    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.http.send(ApiRequest::get("/groups/")).await
    }

    pub async fn create_group(&self, group: &GroupCreate) -> Result<Group, ApiError> {
        self.http.send(ApiRequest::post("/groups/").json(group)?).await
    }

    pub async fn update_group(&self, group_id: i64, update: &GroupUpdate) -> Result<Group, ApiError> {
        let request = ApiRequest::put(format!("/groups/{group_id}")).json(update)?;
        self.http.send(request).await
    }

    pub async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        self.http
            .send_empty(ApiRequest::delete(format!("/groups/{group_id}")))
            .await
    }
}
