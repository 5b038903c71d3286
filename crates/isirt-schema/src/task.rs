use serde::{Deserialize, Serialize};

use crate::IncidentSeverity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
    /// Any intermediate state the backend reports (e.g. "processing").
    #[serde(other)]
    InProgress,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Acknowledgement returned when a background task is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncTask {
    #[serde(default)]
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl AsyncTask {
    /// Server-supplied reason for a failed task, if any.
    pub fn failure_reason(&self) -> Option<String> {
        let error = self.result.as_ref()?.get("error")?;
        match error {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentSuggestionRequest {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentSuggestion {
    #[serde(default)]
    pub suggested_title: Option<String>,
    #[serde(default)]
    pub suggested_category_id: Option<i64>,
    #[serde(default)]
    pub suggested_severity: Option<IncidentSeverity>,
    #[serde(default)]
    pub suggested_incident_type_id: Option<i64>,
    #[serde(default)]
    pub suggested_user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSummaryRequest {
    pub conversation_history: Vec<DialogueTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSummary {
    pub summary: String,
    pub detailed_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotRequest {
    pub prompt: String,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotReply {
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_is_in_progress() {
        let task: AsyncTask =
            serde_json::from_value(serde_json::json!({"task_id": "t", "status": "processing"}))
                .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(!task.status.is_terminal());
    }

    #[test]
    fn failure_reason_reads_result_error() {
        let task: AsyncTask = serde_json::from_value(serde_json::json!({
            "task_id": "t",
            "status": "failed",
            "result": {"error": "model unavailable"}
        }))
        .unwrap();
        assert_eq!(task.failure_reason().as_deref(), Some("model unavailable"));

        let bare: AsyncTask =
            serde_json::from_value(serde_json::json!({"status": "failed"})).unwrap();
        assert!(bare.failure_reason().is_none());
    }

    #[test]
    fn suggestion_parses_backend_severity() {
        let suggestion: IncidentSuggestion = serde_json::from_value(serde_json::json!({
            "suggested_severity": "SEV-2 (Alto)",
            "suggested_category_id": 4
        }))
        .unwrap();
        assert_eq!(suggestion.suggested_severity, Some(IncidentSeverity::Sev2));
        assert_eq!(suggestion.suggested_category_id, Some(4));
    }
}
