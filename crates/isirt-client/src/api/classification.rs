use isirt_schema::{Asset, AssetType, AttackVector, ClassificationCatalog, IncidentCategory, IncidentType};

use crate::{ApiError, ApiRequest, IsirtClient};

/// Category whose types are listed when the caller does not pick one.
pub const DEFAULT_INCIDENT_CATEGORY_ID: i64 = 1;

impl IsirtClient {
    pub async fn asset_types(&self) -> Result<Vec<AssetType>, ApiError> {
        self.http
            .send(ApiRequest::get("/classification/asset-types/"))
            .await
    }

    pub async fn assets(&self, asset_type_id: Option<i64>) -> Result<Vec<Asset>, ApiError> {
        let mut request = ApiRequest::get("/classification/assets/");
        if let Some(asset_type_id) = asset_type_id {
            request = request.query("asset_type_id", asset_type_id);
        }
        self.http.send(request).await
    }

    pub async fn incident_categories(&self) -> Result<Vec<IncidentCategory>, ApiError> {
        self.http
            .send(ApiRequest::get("/classification/incident-categories/"))
            .await
    }

    pub async fn incident_types(&self, category_id: Option<i64>) -> Result<Vec<IncidentType>, ApiError> {
        let request = ApiRequest::get("/classification/incident-types/").query(
            "incident_category_id",
            category_id.unwrap_or(DEFAULT_INCIDENT_CATEGORY_ID),
        );
        self.http.send(request).await
    }

    pub async fn attack_vectors(&self) -> Result<Vec<AttackVector>, ApiError> {
        self.http
            .send(ApiRequest::get("/classification/attack-vectors/"))
            .await
    }

    /// Loads every dropdown list concurrently; nothing is returned unless
    /// all of them succeed.
    pub async fn classification_catalog(&self) -> Result<ClassificationCatalog, ApiError> {
        let (asset_types, assets, categories, attack_vectors) = tokio::try_join!(
            self.asset_types(),
            self.assets(None),
            self.incident_categories(),
            self.attack_vectors(),
        )?;
        Ok(ClassificationCatalog {
            asset_types,
            assets,
            categories,
            attack_vectors,
        })
    }
}
