use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetType {
    pub asset_type_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub asset_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub asset_type_id: i64,
    #[serde(default)]
    pub asset_type: Option<AssetType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentCategory {
    pub incident_category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentType {
    pub incident_type_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub incident_category_id: i64,
    #[serde(default)]
    pub incident_category: Option<IncidentCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttackVector {
    pub attack_vector_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Every lookup list the intake and triage forms need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationCatalog {
    pub asset_types: Vec<AssetType>,
    pub assets: Vec<Asset>,
    pub categories: Vec<IncidentCategory>,
    pub attack_vectors: Vec<AttackVector>,
}
