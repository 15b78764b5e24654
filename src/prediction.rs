// Client for the external price-prediction service

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    admin_api::ValidationError,
    error::ClientError,
    listing_api::{endpoint_url, read_json},
};

/// Choices the prediction form offers, keyed by field (e.g. "manufacturer" -> ["Audi", ...]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionMetadata(pub BTreeMap<String, Vec<serde_json::Value>>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub mileage: f64,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub engine: Option<String>,
}

impl PredictionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.manufacturer.trim().is_empty() {
            return Err(ValidationError::MissingField("manufacturer"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField("model"));
        }
        if self.mileage < 0.0 || !self.mileage.is_finite() {
            return Err(ValidationError::InvalidValue { field: "mileage", reason: "cannot be negative".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub currency: Option<String>,
}

#[derive(Clone)]
pub struct PredictionClient {
    client: Arc<Client>,
    base_url: Option<String>,
}

impl PredictionClient {
    pub fn new(client: Arc<Client>, base_url: Option<String>) -> Self {
        PredictionClient { client, base_url }
    }

    fn base(&self) -> Result<&str, ClientError> {
        self.base_url.as_deref().ok_or(ClientError::NotConfigured("prediction service"))
    }

    pub async fn metadata(&self) -> Result<PredictionMetadata, ClientError> {
        let url = endpoint_url(self.base()?, "api/metadata")?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ClientError> {
        request.validate()?;
        let url = endpoint_url(self.base()?, "api/predict")?;
        tracing::debug!(manufacturer = %request.manufacturer, model = %request.model, "Requesting price prediction");
        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictionRequest {
        PredictionRequest {
            manufacturer: "Toyota".into(),
            model: "Yaris".into(),
            year: 2018,
            mileage: 62000.0,
            fuel_type: Some("Petrol".into()),
            transmission: None,
            engine: None,
        }
    }

    #[test]
    fn blank_model_or_negative_mileage_is_rejected() {
        assert!(request().validate().is_ok());
        assert_eq!(
            PredictionRequest { model: " ".into(), ..request() }.validate(),
            Err(ValidationError::MissingField("model"))
        );
        assert!(PredictionRequest { mileage: -1.0, ..request() }.validate().is_err());
    }

    #[tokio::test]
    async fn unconfigured_service_fails_without_a_request() {
        let client = PredictionClient::new(Arc::new(Client::new()), None);
        assert!(matches!(client.metadata().await, Err(ClientError::NotConfigured(_))));
    }

    #[test]
    fn metadata_accepts_mixed_value_lists() {
        let raw = r#"{"manufacturer":["Audi","BMW"],"year":[2019,2020]}"#;
        let metadata: PredictionMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.0["year"].len(), 2);
    }
}
