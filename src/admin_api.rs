// Back-office client: inventory, colors, features, sellers, showrooms and
// showroom allocations. Every call carries the caller's bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    error::ClientError,
    listing_api::{endpoint_url, expect_success, read_json},
    models::{Listing, SaleStatus, Specification},
};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("select a showroom before allocating")]
    MissingShowroom,
    #[error("allocation quantity must be at least 1")]
    ZeroQuantity,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// A back-office collection. `Self` is the payload sent on create/update,
/// `Record` what the backend returns for it.
pub trait AdminResource: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Record: Serialize + DeserializeOwned + Send + 'static;

    const PATH: &'static str;
    const NAME: &'static str;

    /// Checked before anything is sent; a failure never reaches the backend.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

// --- Resources ---

/// Inventory write payload; reads come back as full listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarInput {
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub tax_rate: Option<f64>,
    pub mileage: Option<f64>,
    #[serde(default)]
    pub specification: Specification,
    #[serde(default)]
    pub features: Vec<String>,
    pub color_id: Option<String>,
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl AdminResource for CarInput {
    type Record = Listing;
    const PATH: &'static str = "admin/cars";
    const NAME: &'static str = "car";

    fn validate(&self) -> Result<(), ValidationError> {
        require("manufacturer", &self.manufacturer)?;
        require("model", &self.model)?;
        if self.price < 0.0 || !self.price.is_finite() {
            return Err(ValidationError::InvalidValue { field: "price", reason: "must be a positive amount".into() });
        }
        if let Some(mileage) = self.mileage {
            if mileage < 0.0 {
                return Err(ValidationError::InvalidValue { field: "mileage", reason: "cannot be negative".into() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: Option<String>,
    pub name: String,
    pub hex_code: Option<String>,
}

impl AdminResource for Color {
    type Record = Color;
    const PATH: &'static str = "colors";
    const NAME: &'static str = "color";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if let Some(hex) = self.hex_code.as_deref() {
            let digits = hex.strip_prefix('#').unwrap_or(hex);
            if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ValidationError::InvalidValue { field: "hexCode", reason: format!("`{hex}` is not a #RRGGBB color") });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: Option<String>,
    pub name: String,
}

impl AdminResource for Feature {
    type Record = Feature;
    const PATH: &'static str = "features";
    const NAME: &'static str = "feature";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub showroom_id: Option<String>,
}

impl AdminResource for Seller {
    type Record = Seller;
    const PATH: &'static str = "Admin/sellers";
    const NAME: &'static str = "seller";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidValue { field: "email", reason: "missing @".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Showroom {
    pub id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl AdminResource for Showroom {
    type Record = Showroom;
    const PATH: &'static str = "Admin/showrooms";
    const NAME: &'static str = "showroom";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

/// Request to place `quantity` units of a car in a showroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAllocation {
    pub car_id: String,
    pub showroom_id: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: Option<String>,
    pub car_id: String,
    pub showroom_id: String,
    pub quantity: u32,
}

impl AdminResource for NewAllocation {
    type Record = Allocation;
    const PATH: &'static str = "admin/allocations";
    const NAME: &'static str = "allocation";

    fn validate(&self) -> Result<(), ValidationError> {
        require("carId", &self.car_id)?;
        match self.showroom_id.as_deref() {
            Some(id) if !id.trim().is_empty() => {}
            _ => return Err(ValidationError::MissingShowroom),
        }
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        Ok(())
    }
}

// --- Client ---

#[derive(Clone)]
pub struct AdminApi {
    client: Arc<Client>,
    base_url: String,
}

impl AdminApi {
    pub fn new(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        AdminApi { client, base_url: base_url.into() }
    }

    pub async fn list<R: AdminResource>(&self, token: &str) -> Result<Vec<R::Record>, ClientError> {
        let url = endpoint_url(&self.base_url, R::PATH)?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        read_json(response).await
    }

    pub async fn create<R: AdminResource>(&self, token: &str, payload: &R) -> Result<R::Record, ClientError> {
        payload.validate()?;
        let url = endpoint_url(&self.base_url, R::PATH)?;
        let response = self.client.post(url).bearer_auth(token).json(payload).send().await?;
        let record = read_json(response).await?;
        tracing::info!(resource = R::NAME, "Created record");
        Ok(record)
    }

    pub async fn update<R: AdminResource>(&self, token: &str, id: &str, payload: &R) -> Result<R::Record, ClientError> {
        payload.validate()?;
        let url = self.item_url::<R>(id)?;
        let response = self.client.put(url).bearer_auth(token).json(payload).send().await?;
        let record = read_json(response).await?;
        tracing::info!(resource = R::NAME, id, "Updated record");
        Ok(record)
    }

    pub async fn delete<R: AdminResource>(&self, token: &str, id: &str) -> Result<(), ClientError> {
        let url = self.item_url::<R>(id)?;
        let response = self.client.delete(url).bearer_auth(token).send().await?;
        expect_success(response).await?;
        tracing::info!(resource = R::NAME, id, "Deleted record");
        Ok(())
    }

    fn item_url<R: AdminResource>(&self, id: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = endpoint_url(&self.base_url, R::PATH)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }
}
