use bytes::Bytes;
use chrono::Utc;
use isirt_schema::{
    EvidenceFile, Incident, IncidentCreate, IncidentLog, IncidentUpdate, IsirtAnalysisRequest,
    ManualLogEntry,
};
use serde_json::Value;

use crate::{ApiError, ApiRequest, FilePart, IsirtClient, LONG_RUNNING_TIMEOUT};

/// Multipart field names the creation endpoint expects.
pub const INCIDENT_DATA_FIELD: &str = "incident_data";
pub const EVIDENCE_FILES_FIELD: &str = "evidence_files";

impl IsirtClient {
    pub async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.http.send(ApiRequest::get("/incidents/")).await
    }

    /// Always fetches a fresh copy: `_t` keeps intermediaries from serving a
    /// cached incident.
    pub async fn get_incident(&self, incident_id: i64) -> Result<Incident, ApiError> {
        let request = ApiRequest::get(format!("/incidents/{incident_id}"))
            .query("_t", Utc::now().timestamp_millis());
        self.http.send(request).await
    }

    /// Graph of entities linked to the incident (`nodes` / `edges`).
    pub async fn related_entities(&self, incident_id: i64) -> Result<Value, ApiError> {
        let request = ApiRequest::get(format!("/incidents/{incident_id}/related-entities"));
        Ok(self.http.send_value(request).await?.unwrap_or(Value::Null))
    }

    pub async fn create_incident(
        &self,
        incident: &IncidentCreate,
        evidence: Vec<FilePart>,
    ) -> Result<Incident, ApiError> {
        let incident_data = serde_json::to_string(incident)
            .map_err(|e| ApiError::InvalidRequest(format!("failed to encode incident: {e}")))?;
        let files = evidence
            .into_iter()
            .map(|mut file| {
                file.field = EVIDENCE_FILES_FIELD.to_string();
                file
            })
            .collect();
        let request = ApiRequest::post("/incidents/")
            .multipart(vec![(INCIDENT_DATA_FIELD.to_string(), incident_data)], files)
            .timeout(LONG_RUNNING_TIMEOUT);
        self.http.send(request).await
    }

    pub async fn update_incident(
        &self,
        incident_id: i64,
        update: &IncidentUpdate,
    ) -> Result<Incident, ApiError> {
        let request = ApiRequest::put(format!("/incidents/{incident_id}")).json(update)?;
        self.http.send(request).await
    }

    pub async fn add_incident_log(
        &self,
        incident_id: i64,
        comments: &str,
    ) -> Result<IncidentLog, ApiError> {
        let entry = ManualLogEntry {
            comments: comments.to_string(),
        };
        let request = ApiRequest::post(format!("/incidents/{incident_id}/logs")).json(&entry)?;
        self.http.send(request).await
    }

    pub async fn triage_incident(&self, incident_id: i64) -> Result<Value, ApiError> {
        let request = ApiRequest::post(format!("/incidents/{incident_id}/triage"));
        Ok(self.http.send_value(request).await?.unwrap_or(Value::Null))
    }

    pub async fn isirt_analysis(
        &self,
        incident_id: i64,
        analysis: &IsirtAnalysisRequest,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::post(format!("/incidents/{incident_id}/isirt-analysis"))
            .json(analysis)?
            .timeout(LONG_RUNNING_TIMEOUT);
        Ok(self.http.send_value(request).await?.unwrap_or(Value::Null))
    }

    pub async fn list_evidence(&self, incident_id: i64) -> Result<Vec<EvidenceFile>, ApiError> {
        self.http
            .send(ApiRequest::get(format!("/incidents/{incident_id}/evidence")))
            .await
    }

    pub async fn download_evidence(&self, incident_id: i64, file_id: i64) -> Result<Bytes, ApiError> {
        let request = ApiRequest::get(format!(
            "/incidents/{incident_id}/evidence/{file_id}/download"
        ));
        self.http.send_bytes(request).await
    }
}
