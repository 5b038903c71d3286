use isirt_schema::{
    AiSettings, AiSettingsUpdate, AvailableAiModel, KnowledgeFlag, RagSettings, RagSettingsUpdate,
};
use serde_json::Value;

use crate::{ApiError, ApiRequest, IsirtClient, LONG_RUNNING_TIMEOUT};

impl IsirtClient {
    pub async fn ai_settings(&self) -> Result<AiSettings, ApiError> {
        self.http.send(ApiRequest::get("/ai-settings/")).await
    }

    pub async fn save_ai_settings(&self, update: &AiSettingsUpdate) -> Result<AiSettings, ApiError> {
        self.http
            .send(ApiRequest::put("/ai-settings/").json(update)?)
            .await
    }

    pub async fn available_ai_models(&self, provider: Option<&str>) -> Result<Vec<AvailableAiModel>, ApiError> {
        let mut request = ApiRequest::get("/ai-settings/available-models");
        if let Some(provider) = provider.filter(|p| !p.is_empty()) {
            request = request.query("provider", provider);
        }
        self.http.send(request).await
    }

    /// Rebuilds the retrieval index from the knowledge base. Slow.
    pub async fn reload_rag(&self) -> Result<Value, ApiError> {
        let request = ApiRequest::post("/ai-settings/reload-rag").timeout(LONG_RUNNING_TIMEOUT);
        Ok(self.http.send_value(request).await?.unwrap_or(Value::Null))
    }

    pub async fn rag_settings(&self) -> Result<RagSettings, ApiError> {
        self.http.send(ApiRequest::get("/rag-settings/")).await
    }

    pub async fn save_rag_settings(&self, update: &RagSettingsUpdate) -> Result<RagSettings, ApiError> {
        self.http
            .send(ApiRequest::put("/rag-settings/").json(update)?)
            .await
    }

    pub async fn flag_knowledge_chunk(&self, flag: &KnowledgeFlag) -> Result<Value, ApiError> {
        let request = ApiRequest::post("/rag/curate").json(flag)?;
        Ok(self.http.send_value(request).await?.unwrap_or(Value::Null))
    }
}
