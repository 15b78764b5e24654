// Car dealership marketplace: backend-for-frontend over the dealership REST API

use anyhow::{Context, Result};
use axum::{Router, extract::FromRef};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod admin_api;
pub mod auth_middleware;
pub mod blog_search;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod filters;
pub mod listing_api;
pub mod models;
pub mod prediction;
pub mod presenter;
pub mod routes;
pub mod search;
pub mod wishlist;

use crate::{
    admin_api::AdminApi,
    config::Settings,
    listing_api::{FilterOptionsCache, ListingApi},
    prediction::PredictionClient,
};

// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<Client>,
    pub listings: ListingApi,
    pub admin: AdminApi,
    pub prediction: PredictionClient,
    pub filter_options: Arc<FilterOptionsCache>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let http_client = Arc::new(
            Client::builder()
                .user_agent(concat!("dealership_rust/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(settings.request_timeout_secs))
                .build()
                .context("Failed to build shared reqwest client")?,
        );
        Ok(Self::with_client(settings, http_client))
    }

    pub fn with_client(settings: Settings, http_client: Arc<Client>) -> Self {
        let listings = ListingApi::new(http_client.clone(), settings.backend_base_url.clone());
        let admin = AdminApi::new(http_client.clone(), settings.backend_base_url.clone());
        let prediction = PredictionClient::new(http_client.clone(), settings.prediction_base_url.clone());
        let filter_options = Arc::new(FilterOptionsCache::new(settings.filter_options_ttl_secs));

        AppState {
            settings: Arc::new(settings),
            http_client,
            listings,
            admin,
            prediction,
            filter_options,
        }
    }
}

/// Full application: pages, JSON API, static assets and request tracing.
pub fn build_app(app_state: AppState) -> Router {
    let static_dir = app_state.settings.static_dir.clone();
    routes::create_router(app_state)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
