use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<i64>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedAuditLogs {
    pub total: u64,
    pub logs: Vec<AuditLog>,
}

/// Query filters for `GET /audit-logs/`. Unset or empty values are left off
/// the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilters {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AuditLogFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                query.push((key.to_string(), value));
            }
        };
        push("skip", self.skip.map(|v| v.to_string()));
        push("limit", self.limit.map(|v| v.to_string()));
        push("user_id", self.user_id.map(|v| v.to_string()));
        push("action", self.action.clone());
        push("resource_type", self.resource_type.clone());
        push("start_date", self.start_date.clone());
        push("end_date", self.end_date.clone());
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivityMetrics {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default)]
    pub total_incidents_created: u64,
    #[serde(default)]
    pub total_incidents_resolved: u64,
    #[serde(default)]
    pub total_incidents_assigned: u64,
    #[serde(default, with = "crate::timestamp::option")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub top_incident_types: Vec<String>,
    #[serde(default)]
    pub average_resolution_time_hours: Option<f64>,
    #[serde(default)]
    pub incidents_by_status: HashMap<String, u64>,
    #[serde(default)]
    pub login_frequency_per_week: Option<f64>,
    #[serde(default)]
    pub total_comments_made: u64,
    #[serde(default)]
    pub total_files_uploaded: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRelationship {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub relationship_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogItem {
    pub log_id: i64,
    pub incident_id: i64,
    pub action: String,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLogItem {
    pub history_id: i64,
    pub incident_id: i64,
    pub field_changed: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCrossReference {
    pub metrics: UserActivityMetrics,
    #[serde(default)]
    pub incidents: Vec<IncidentRelationship>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityLogItem>,
    #[serde(default)]
    pub history_logs: Vec<HistoryLogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_drop_empty_and_missing_values() {
        let filters = AuditLogFilters {
            limit: Some(50),
            action: Some(String::new()),
            resource_type: Some("INCIDENT".into()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("limit".to_string(), "50".to_string()),
                ("resource_type".to_string(), "INCIDENT".to_string()),
            ]
        );
    }

    #[test]
    fn paginated_logs_parse() {
        let raw = serde_json::json!({
            "total": 1,
            "logs": [{
                "id": 3,
                "user_id": 1,
                "action": "LOGIN",
                "resource_type": "USER",
                "timestamp": "2024-05-01T10:00:00Z"
            }]
        });
        let page: PaginatedAuditLogs = serde_json::from_value(raw).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.logs[0].success);
    }
}
