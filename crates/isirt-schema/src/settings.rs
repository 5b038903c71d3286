use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_model_provider() -> String {
    "gemini".to_string()
}

fn default_model_name() -> String {
    "gemini-1.5-pro-latest".to_string()
}

fn default_parameters() -> HashMap<String, serde_json::Value> {
    HashMap::from([("temperature".to_string(), serde_json::json!(0.7))])
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default = "default_model_provider")]
    pub model_provider: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub isirt_prompt: String,
    #[serde(default = "default_parameters")]
    pub parameters: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AiSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isirt_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableAiModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub provider: String,
    pub model_name: String,
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_chunk_overlap() -> u32 {
    150
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<u32>,
}

/// Marks a retrieved knowledge chunk for curation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFlag {
    pub source_name: String,
    pub chunk_id: String,
    pub notes: String,
}
