// Shared helpers: an in-process stand-in for the dealership backend
#![allow(dead_code)]

use axum::Router;
use dealership_rust::{config::Settings, listing_api::ListingApi};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral port and returns the matching `backend_base_url`.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

// Nothing listens on the discard port
pub const UNREACHABLE: &str = "http://127.0.0.1:9/api";

pub fn client() -> Arc<Client> {
    Arc::new(Client::new())
}

pub fn api(base_url: &str) -> ListingApi {
    ListingApi::new(client(), base_url)
}

pub fn settings(base_url: &str) -> Settings {
    Settings { backend_base_url: base_url.to_string(), ..Settings::default() }
}

pub fn car(id: &str, price: f64) -> Value {
    json!({
        "id": id,
        "manufacturer": "Skoda",
        "model": "Fabia",
        "year": 2019,
        "mileage": 40000,
        "price": price,
        "taxRate": 20,
        "status": "Available",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

pub fn cars(count: usize) -> Value {
    Value::Array((0..count).map(|i| car(&format!("car-{i}"), 10000.0 + i as f64 * 500.0)).collect())
}
