// Runtime settings: defaults, optional config.toml, then APP_* environment variables

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_address: String,
    // Base of the dealership REST backend, e.g. http://127.0.0.1:5000/api
    pub backend_base_url: String,
    // Price-prediction service; prediction routes answer 500 when unset
    pub prediction_base_url: Option<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub filter_options_ttl_secs: u64,
    pub static_dir: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("backend_base_url", "http://127.0.0.1:5000/api")?
            .set_default("page_size", 5)?
            .set_default("request_timeout_secs", 15)?
            .set_default("filter_options_ttl_secs", 300)?
            .set_default("static_dir", "static")?
            .add_source(File::with_name("config").required(false))
            // Double underscore so field names keep their single underscores (APP_BACKEND_BASE_URL)
            .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server_address: "127.0.0.1:3000".to_string(),
            backend_base_url: "http://127.0.0.1:5000/api".to_string(),
            prediction_base_url: None,
            page_size: crate::presenter::PUBLIC_PAGE_SIZE,
            request_timeout_secs: 15,
            filter_options_ttl_secs: 300,
            static_dir: "static".to_string(),
        }
    }
}
