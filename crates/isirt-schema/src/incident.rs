use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Asset, AttackVector, Group, IncidentType, UserProfile};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentStatus {
    #[serde(rename = "Nuevo")]
    New,
    #[serde(rename = "Investigando")]
    Investigating,
    #[serde(rename = "Contenido")]
    Contained,
    #[serde(rename = "Erradicado")]
    Eradicated,
    #[serde(rename = "Recuperando")]
    Recovering,
    #[serde(rename = "Resuelto")]
    Resolved,
    #[serde(rename = "Cerrado")]
    Closed,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 7] = [
        Self::New,
        Self::Investigating,
        Self::Contained,
        Self::Eradicated,
        Self::Recovering,
        Self::Resolved,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "Nuevo",
            Self::Investigating => "Investigando",
            Self::Contained => "Contenido",
            Self::Eradicated => "Erradicado",
            Self::Recovering => "Recuperando",
            Self::Resolved => "Resuelto",
            Self::Closed => "Cerrado",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncidentSeverity {
    #[serde(rename = "-- Evaluar según matriz --")]
    Unassessed,
    #[serde(rename = "SEV-1 (Crítico)")]
    Sev1,
    #[serde(rename = "SEV-2 (Alto)")]
    Sev2,
    #[serde(rename = "SEV-3 (Medio)")]
    Sev3,
    #[serde(rename = "SEV-4 (Bajo)")]
    Sev4,
}

impl IncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassessed => "-- Evaluar según matriz --",
            Self::Sev1 => "SEV-1 (Crítico)",
            Self::Sev2 => "SEV-2 (Alto)",
            Self::Sev3 => "SEV-3 (Medio)",
            Self::Sev4 => "SEV-4 (Bajo)",
        }
    }
}

impl fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: i64,
    pub ticket_id: String,
    pub summary: String,
    pub description: String,
    pub status: IncidentStatus,
    #[serde(default)]
    pub severity: Option<IncidentSeverity>,
    #[serde(default, with = "crate::timestamp::option")]
    pub discovery_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_conversation: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, with = "crate::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp::option")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub impact_confidentiality: Option<i32>,
    #[serde(default)]
    pub impact_integrity: Option<i32>,
    #[serde(default)]
    pub impact_availability: Option<i32>,
    #[serde(default)]
    pub total_impact: Option<i32>,
    #[serde(default)]
    pub root_cause_analysis: Option<String>,
    #[serde(default)]
    pub containment_actions: Option<String>,
    #[serde(default)]
    pub recovery_actions: Option<String>,
    #[serde(default)]
    pub lessons_learned: Option<String>,
    #[serde(default)]
    pub corrective_actions: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub ai_recommendations: Option<serde_json::Value>,
    #[serde(default)]
    pub reporter: Option<UserProfile>,
    #[serde(default)]
    pub assignee: Option<UserProfile>,
    #[serde(default)]
    pub assignee_group: Option<Group>,
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default)]
    pub incident_type: Option<IncidentType>,
    #[serde(default)]
    pub attack_vector: Option<AttackVector>,
    #[serde(default)]
    pub logs: Vec<IncidentLog>,
    #[serde(default)]
    pub evidence_files: Vec<EvidenceFile>,
}

/// Payload sent as the `incident_data` form field on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentCreate {
    pub summary: String,
    pub description: String,
    pub discovery_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_vector_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_asset_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IncidentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<IncidentSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_vector_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containment_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_confidentiality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_integrity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_availability: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_impact: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentLog {
    pub log_id: i64,
    pub incident_id: i64,
    pub action: String,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub field_modified: Option<String>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Manual log entry added by an analyst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualLogEntry {
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFile {
    pub file_id: i64,
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    pub file_type: String,
    pub file_size_bytes: u64,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default, with = "crate::timestamp::option")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IsirtAnalysisRequest {
    #[serde(default)]
    pub additional_context: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_to_backend_labels() {
        let value = serde_json::to_value(IncidentSeverity::Sev2).unwrap();
        assert_eq!(value, "SEV-2 (Alto)");
        let parsed: IncidentSeverity = serde_json::from_value("SEV-1 (Crítico)".into()).unwrap();
        assert_eq!(parsed, IncidentSeverity::Sev1);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(IncidentStatus::parse("resuelto"), Some(IncidentStatus::Resolved));
        assert_eq!(IncidentStatus::parse("done"), None);
    }

    #[test]
    fn incident_tolerates_minimal_payload() {
        let raw = serde_json::json!({
            "incident_id": 7,
            "ticket_id": "INC-0007",
            "summary": "phishing",
            "description": "mail with link",
            "status": "Nuevo"
        });
        let incident: Incident = serde_json::from_value(raw).unwrap();
        assert_eq!(incident.incident_id, 7);
        assert!(incident.severity.is_none());
        assert!(incident.logs.is_empty());
    }

    #[test]
    fn incident_update_serializes_only_set_fields() {
        let update = IncidentUpdate {
            status: Some(IncidentStatus::Contained),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({"status": "Contenido"})
        );
    }
}
