// Typed payloads exchanged with the dealership backend

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ListingId = String;

// --- Listings ---

/// Sale status as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleStatus {
    Available,
    #[serde(rename = "Pending Deposit")]
    PendingDeposit,
    Sold,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Deposit Paid")]
    DepositPaid,
    #[serde(rename = "Pending Full Payment")]
    PendingFullPayment,
}

/// The four buckets shown to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusBucket {
    Available,
    Sold,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Deposit Paid")]
    DepositPaid,
}

impl SaleStatus {
    pub fn display_bucket(&self) -> StatusBucket {
        match self {
            SaleStatus::Available => StatusBucket::Available,
            SaleStatus::Sold => StatusBucket::Sold,
            SaleStatus::OnHold | SaleStatus::PendingDeposit => StatusBucket::OnHold,
            SaleStatus::DepositPaid | SaleStatus::PendingFullPayment => StatusBucket::DepositPaid,
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusBucket::Available => "Available",
            StatusBucket::Sold => "Sold",
            StatusBucket::OnHold => "On Hold",
            StatusBucket::DepositPaid => "Deposit Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowroomRef {
    pub id: Option<String>,
    pub name: String,
    pub quantity: Option<u32>,
}

/// A single car for sale. Only `id` is mandatory; a payload without it is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<f64>,
    pub price: Option<f64>,
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub specification: Specification,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub showrooms: Vec<ShowroomRef>,
    pub status: Option<SaleStatus>,
    pub created_at: Option<String>,
}

impl Listing {
    /// "Manufacturer Model", falling back to whichever part is known.
    pub fn title(&self) -> String {
        match (self.manufacturer.as_deref(), self.model.as_deref()) {
            (Some(make), Some(model)) => format!("{make} {model}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => format!("Listing {}", self.id),
        }
    }

    pub fn status_bucket(&self) -> Option<StatusBucket> {
        self.status.map(|s| s.display_bucket())
    }

    /// Price including tax, when both parts are known.
    pub fn price_with_tax(&self) -> Option<f64> {
        match (self.price, self.tax_rate) {
            (Some(price), Some(rate)) => Some(price * (1.0 + rate / 100.0)),
            (Some(price), None) => Some(price),
            _ => None,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub cars: Vec<Listing>,
    pub total_pages: u32,
    pub total_results: u32,
}

/// What `GET User/cars` may return: the paged envelope, or (older deployments) a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    #[serde(rename_all = "camelCase")]
    Paged {
        cars: Vec<Listing>,
        total_pages: u32,
        total_results: u32,
    },
    Bare(Vec<Listing>),
}

/// Body of a non-2xx backend response.
#[derive(Debug, Deserialize)]
pub struct BackendMessage {
    pub message: Option<String>,
}

// --- Filter options ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn any(label: &str) -> Self {
        FilterOption { value: String::new(), label: label.to_string() }
    }
}

// Option endpoints return either plain strings or {value,label} objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Text(String),
    Number(f64),
    Labeled { value: serde_json::Value, label: String },
}

impl From<RawOption> for FilterOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Text(text) => FilterOption { value: text.clone(), label: text },
            RawOption::Number(n) => {
                let text = crate::filters::format_number(n);
                FilterOption { value: text.clone(), label: text }
            }
            RawOption::Labeled { value, label } => {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                FilterOption { value, label }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub years: Vec<FilterOption>,
    pub mileage_ranges: Vec<FilterOption>,
    pub price_ranges: Vec<FilterOption>,
    pub features: Vec<FilterOption>,
    pub vehicle_types: Vec<FilterOption>,
    pub fuel_types: Vec<FilterOption>,
}

// --- Reviews & blog ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: u8,
    pub content: String,
    pub user_name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
}

impl ReviewSummary {
    pub fn new(reviews: Vec<Review>) -> Self {
        let average_rating = if reviews.is_empty() {
            None
        } else {
            let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
            Some(f64::from(sum) / reviews.len() as f64)
        };
        ReviewSummary { reviews, average_rating }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub published_at: Option<String>,
    pub cover_image: Option<String>,
}
