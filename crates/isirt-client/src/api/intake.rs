use isirt_schema::{
    AsyncTask, ChatbotReply, ChatbotRequest, DialogueSummary, DialogueSummaryRequest,
    DialogueTurn, IncidentSuggestionRequest, TaskHandle,
};

use crate::{ApiError, ApiRequest, IsirtClient, SUMMARY_TIMEOUT};

impl IsirtClient {
    /// Starts a background suggestion analysis; poll the returned task id.
    pub async fn request_incident_suggestions(&self, description: &str) -> Result<TaskHandle, ApiError> {
        let body = IncidentSuggestionRequest {
            description: description.to_string(),
        };
        let request = ApiRequest::post("/incident-suggestions/request").json(&body)?;
        self.http.send(request).await
    }

    pub async fn suggestion_task_status(&self, task_id: &str) -> Result<AsyncTask, ApiError> {
        self.http
            .send(ApiRequest::get(format!("/incident-suggestions/status/{task_id}")))
            .await
    }

    pub async fn summarize_dialogue(&self, turns: Vec<DialogueTurn>) -> Result<DialogueSummary, ApiError> {
        let body = DialogueSummaryRequest {
            conversation_history: turns,
        };
        let request = ApiRequest::post("/incident-reports/summarize")
            .json(&body)?
            .timeout(SUMMARY_TIMEOUT);
        self.http.send(request).await
    }

    pub async fn ask_chatbot(&self, prompt: &str, conversation_id: &str) -> Result<ChatbotReply, ApiError> {
        let body = ChatbotRequest {
            prompt: prompt.to_string(),
            conversation_id: conversation_id.to_string(),
        };
        self.http
            .send(ApiRequest::post("/reporting/ask").json(&body)?)
            .await
    }
}
