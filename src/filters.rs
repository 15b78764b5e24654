// Search filter state: range normalization, query serialization, reset

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Token the year dropdown uses for "any year before 2005".
pub const BEFORE_2005: &str = "before-2005";
const BEFORE_2005_BOUNDS: RangeBounds = RangeBounds { from: Some(0.0), to: Some(2004.0) };

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("invalid range token `{0}`")]
    InvalidRange(String),
    #[error("{field} range is inverted: {from} > {to}")]
    InvertedRange { field: &'static str, from: f64, to: f64 },
    #[error("unknown sort key `{0}`")]
    UnknownSort(String),
}

// --- Ranges ---

/// Numeric `{from, to}` pair; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

/// Parses a dropdown range token (`"20000-40000"`, `"50000-max"`, `"before-2005"`, `""`).
pub fn parse_range(token: &str) -> Result<RangeBounds, FilterError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(RangeBounds::default());
    }
    if token == BEFORE_2005 {
        return Ok(BEFORE_2005_BOUNDS);
    }

    let invalid = || FilterError::InvalidRange(token.to_string());
    if let Some(left) = token.strip_suffix("-max") {
        let from = parse_bound(left).ok_or_else(invalid)?;
        return Ok(RangeBounds { from: Some(from), to: None });
    }

    let (left, right) = token.split_once('-').ok_or_else(invalid)?;
    let from = parse_bound(left).ok_or_else(invalid)?;
    let to = parse_bound(right).ok_or_else(invalid)?;
    Ok(RangeBounds { from: Some(from), to: Some(to) })
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// Renders a bound the way the dropdown values are written: integral values drop the ".0"
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// --- Enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Cash,
    Installment,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Installment => "installment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
        }
    }
}

/// Client-local ordering applied to an already-fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "mileage-asc")]
    MileageAsc,
    #[serde(rename = "mileage-desc")]
    MileageDesc,
    #[serde(rename = "year-asc")]
    YearAsc,
    #[serde(rename = "year-desc")]
    YearDesc,
}

impl SortBy {
    pub const ALL: [SortBy; 7] = [
        SortBy::Newest,
        SortBy::PriceAsc,
        SortBy::PriceDesc,
        SortBy::MileageAsc,
        SortBy::MileageDesc,
        SortBy::YearAsc,
        SortBy::YearDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::PriceAsc => "price-asc",
            SortBy::PriceDesc => "price-desc",
            SortBy::MileageAsc => "mileage-asc",
            SortBy::MileageDesc => "mileage-desc",
            SortBy::YearAsc => "year-asc",
            SortBy::YearDesc => "year-desc",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| FilterError::UnknownSort(s.to_string()))
    }
}

// --- Criteria ---

/// The full set of search constraints applied to the listing search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub keyword: String,
    pub payment_type: PaymentType,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
    pub vat_deduction: bool,
    pub discounted_cars: bool,
    pub premium_partners: bool,
    #[serde(rename = "driveType4x4")]
    pub drive_type_4x4: bool,
    pub registration_from: Option<f64>,
    pub registration_to: Option<f64>,
    pub mileage_from: Option<f64>,
    pub mileage_to: Option<f64>,
    pub transmission: Option<Transmission>,
    pub fuel_type: String,
    pub vehicle_type: String,
    pub exterior_color: String,
    pub features: Vec<String>,
    pub sort_by: SortBy,
}

/// Partial criteria supplied by a caller (e.g. the homepage hero search).
/// Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOverride {
    pub keyword: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub price_range: Option<String>,
    pub registration_range: Option<String>,
    pub mileage_range: Option<String>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<String>,
    pub vehicle_type: Option<String>,
    pub exterior_color: Option<String>,
    pub features: Option<Vec<String>>,
    #[serde(rename = "driveType4x4")]
    pub drive_type_4x4: Option<bool>,
    pub vat_deduction: Option<bool>,
    pub discounted_cars: Option<bool>,
    pub premium_partners: Option<bool>,
    pub sort_by: Option<SortBy>,
}

impl FilterOverride {
    /// Builds an override from raw form/query pairs. `features` may repeat;
    /// checkboxes accept `true`/`on`; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut overrides = FilterOverride::default();
        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "keyword" => overrides.keyword = Some(value.to_string()),
                "paymentType" => {
                    overrides.payment_type = match value {
                        "installment" => Some(PaymentType::Installment),
                        "cash" => Some(PaymentType::Cash),
                        _ => None,
                    }
                }
                "priceRange" => overrides.price_range = Some(value.to_string()),
                "registrationRange" => overrides.registration_range = Some(value.to_string()),
                "mileageRange" => overrides.mileage_range = Some(value.to_string()),
                "transmission" => {
                    overrides.transmission = match value {
                        "Automatic" => Some(Transmission::Automatic),
                        "Manual" => Some(Transmission::Manual),
                        _ => None,
                    }
                }
                "fuelType" => overrides.fuel_type = Some(value.to_string()),
                "vehicleType" => overrides.vehicle_type = Some(value.to_string()),
                "exteriorColor" => overrides.exterior_color = Some(value.to_string()),
                "features" if !value.is_empty() => {
                    overrides.features.get_or_insert_with(Vec::new).push(value.to_string())
                }
                "driveType4x4" => overrides.drive_type_4x4 = Some(is_checked(value)),
                "vatDeduction" => overrides.vat_deduction = Some(is_checked(value)),
                "discountedCars" => overrides.discounted_cars = Some(is_checked(value)),
                "premiumPartners" => overrides.premium_partners = Some(is_checked(value)),
                "sortBy" if !value.is_empty() => overrides.sort_by = Some(value.parse()?),
                _ => {}
            }
        }
        Ok(overrides)
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value, "true" | "on" | "1")
}

impl FilterCriteria {
    /// Replaces every field with the fixed defaults (cash, no bounds, nothing selected).
    pub fn reset(&mut self) {
        *self = FilterCriteria::default();
    }

    pub fn set_price_range(&mut self, token: &str) -> Result<(), FilterError> {
        let range = parse_range(token)?;
        self.price_from = range.from;
        self.price_to = range.to;
        Ok(())
    }

    pub fn set_registration_range(&mut self, token: &str) -> Result<(), FilterError> {
        let range = parse_range(token)?;
        self.registration_from = range.from;
        self.registration_to = range.to;
        Ok(())
    }

    pub fn set_mileage_range(&mut self, token: &str) -> Result<(), FilterError> {
        let range = parse_range(token)?;
        self.mileage_from = range.from;
        self.mileage_to = range.to;
        Ok(())
    }

    /// Merges a partial override on top of the current values.
    pub fn apply_override(&mut self, overrides: FilterOverride) -> Result<(), FilterError> {
        if let Some(keyword) = overrides.keyword {
            self.keyword = keyword;
        }
        if let Some(payment_type) = overrides.payment_type {
            self.payment_type = payment_type;
        }
        if let Some(token) = overrides.price_range.as_deref() {
            self.set_price_range(token)?;
        }
        if let Some(token) = overrides.registration_range.as_deref() {
            self.set_registration_range(token)?;
        }
        if let Some(token) = overrides.mileage_range.as_deref() {
            self.set_mileage_range(token)?;
        }
        if overrides.transmission.is_some() {
            self.transmission = overrides.transmission;
        }
        if let Some(fuel_type) = overrides.fuel_type {
            self.fuel_type = fuel_type;
        }
        if let Some(vehicle_type) = overrides.vehicle_type {
            self.vehicle_type = vehicle_type;
        }
        if let Some(exterior_color) = overrides.exterior_color {
            self.exterior_color = exterior_color;
        }
        if let Some(features) = overrides.features {
            self.features = features;
        }
        if let Some(flag) = overrides.drive_type_4x4 {
            self.drive_type_4x4 = flag;
        }
        if let Some(flag) = overrides.vat_deduction {
            self.vat_deduction = flag;
        }
        if let Some(flag) = overrides.discounted_cars {
            self.discounted_cars = flag;
        }
        if let Some(flag) = overrides.premium_partners {
            self.premium_partners = flag;
        }
        if let Some(sort_by) = overrides.sort_by {
            self.sort_by = sort_by;
        }
        Ok(())
    }

    /// Rejects any `from > to` pair.
    pub fn validate(&self) -> Result<(), FilterError> {
        let pairs = [
            ("price", self.price_from, self.price_to),
            ("registration", self.registration_from, self.registration_to),
            ("mileage", self.mileage_from, self.mileage_to),
        ];
        for (field, from, to) in pairs {
            if let (Some(from), Some(to)) = (from, to) {
                if from > to {
                    return Err(FilterError::InvertedRange { field, from, to });
                }
            }
        }
        Ok(())
    }

    /// Serializes the criteria into ordered query pairs for the listing endpoint.
    /// `None`, empty strings and `false` are omitted; `sortBy` is local-only.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_str(&mut params, "keyword", &self.keyword);
        push_str(&mut params, "paymentType", self.payment_type.as_str());
        push_number(&mut params, "priceFrom", self.price_from);
        push_number(&mut params, "priceTo", self.price_to);
        push_flag(&mut params, "vatDeduction", self.vat_deduction);
        push_flag(&mut params, "discountedCars", self.discounted_cars);
        push_flag(&mut params, "premiumPartners", self.premium_partners);
        push_flag(&mut params, "driveType4x4", self.drive_type_4x4);
        push_number(&mut params, "registrationFrom", self.registration_from);
        push_number(&mut params, "registrationTo", self.registration_to);
        push_number(&mut params, "mileageFrom", self.mileage_from);
        push_number(&mut params, "mileageTo", self.mileage_to);
        if let Some(transmission) = self.transmission {
            push_str(&mut params, "transmission", transmission.as_str());
        }
        push_str(&mut params, "fuelType", &self.fuel_type);
        push_str(&mut params, "vehicleType", &self.vehicle_type);
        push_str(&mut params, "exteriorColor", &self.exterior_color);
        for feature in self.features.iter().filter(|f| !f.is_empty()) {
            params.push(("features".to_string(), feature.clone()));
        }
        params
    }
}

impl FilterCriteria {
    /// Form-style pairs that reproduce these criteria through `FilterOverride::from_pairs`.
    /// Used for pagination and sort links on rendered pages.
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_str(&mut pairs, "keyword", &self.keyword);
        push_str(&mut pairs, "paymentType", self.payment_type.as_str());
        push_str(&mut pairs, "priceRange", &range_token(self.price_from, self.price_to));
        push_str(
            &mut pairs,
            "registrationRange",
            &range_token(self.registration_from, self.registration_to),
        );
        push_str(&mut pairs, "mileageRange", &range_token(self.mileage_from, self.mileage_to));
        if let Some(transmission) = self.transmission {
            push_str(&mut pairs, "transmission", transmission.as_str());
        }
        push_str(&mut pairs, "fuelType", &self.fuel_type);
        push_str(&mut pairs, "vehicleType", &self.vehicle_type);
        push_str(&mut pairs, "exteriorColor", &self.exterior_color);
        for feature in &self.features {
            push_str(&mut pairs, "features", feature);
        }
        push_flag(&mut pairs, "driveType4x4", self.drive_type_4x4);
        push_flag(&mut pairs, "vatDeduction", self.vat_deduction);
        push_flag(&mut pairs, "discountedCars", self.discounted_cars);
        push_flag(&mut pairs, "premiumPartners", self.premium_partners);
        pairs
    }
}

// Inverse of `parse_range`
fn range_token(from: Option<f64>, to: Option<f64>) -> String {
    match (from, to) {
        (None, None) => String::new(),
        (Some(from), Some(to)) if RangeBounds { from: Some(from), to: Some(to) } == BEFORE_2005_BOUNDS => {
            BEFORE_2005.to_string()
        }
        (Some(from), Some(to)) => format!("{}-{}", format_number(from), format_number(to)),
        (Some(from), None) => format!("{}-max", format_number(from)),
        // No token expresses an upper bound alone; "0-<to>" is the closest
        (None, Some(to)) => format!("0-{}", format_number(to)),
    }
}

fn push_str(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    if !value.is_empty() {
        params.push((key.to_string(), value.to_string()));
    }
}

fn push_number(params: &mut Vec<(String, String)>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        params.push((key.to_string(), format_number(value)));
    }
}

fn push_flag(params: &mut Vec<(String, String)>, key: &str, value: bool) {
    if value {
        params.push((key.to_string(), "true".to_string()));
    }
}
