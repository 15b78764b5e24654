// Client for the public listing endpoints of the dealership backend

use cached::{Cached, TimedCache};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::ClientError,
    filters::FilterCriteria,
    models::{
        BackendMessage, BlogPost, FilterOption, FilterOptions, Listing, RawOption, Review,
        SearchPage, SearchResponse,
    },
};

// Joins a relative endpoint path onto the configured base URL
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, ClientError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&raw).map_err(|e| ClientError::Url(format!("{raw}: {e}")))
}

// Builds the error for a non-2xx response, preferring the backend's own `message`
async fn backend_error(response: Response) -> ClientError {
    let status = response.status();
    let endpoint = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    tracing::debug!(%status, endpoint = %endpoint, body = %body, "Backend error response");
    ClientError::Backend { status, message }
}

// Turns a backend response into `T`, surfacing the backend's `message` on non-2xx statuses
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(backend_error(response).await);
    }
    let endpoint = response.url().path().to_string();
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { endpoint, source })
}

// For calls whose body is irrelevant (deletes)
pub(crate) async fn expect_success(response: Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(backend_error(response).await)
    }
}

/// Number of pages needed for `len` items; a zero page size counts as one item per page.
pub fn page_count(len: usize, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as usize;
    len.div_ceil(per_page) as u32
}

#[derive(Clone)]
pub struct ListingApi {
    client: Arc<Client>,
    base_url: String,
}

impl ListingApi {
    pub fn new(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        ListingApi { client, base_url: base_url.into() }
    }

    /// Fetches one page of listings for `criteria`.
    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, ClientError> {
        let mut url = endpoint_url(&self.base_url, "User/cars")?;
        {
            let mut query = url.query_pairs_mut();
            query.extend_pairs(criteria.to_query_params());
            query.append_pair("page", &page.to_string());
            query.append_pair("perPage", &per_page.to_string());
        }
        tracing::debug!(%url, "Searching listings");

        let response = self.client.get(url).send().await?;
        let search_page = match read_json::<SearchResponse>(response).await? {
            SearchResponse::Paged { cars, total_pages, total_results } => {
                SearchPage { cars, total_pages, total_results }
            }
            SearchResponse::Bare(cars) => {
                // Older backend deployments answer with a plain array
                tracing::debug!(count = cars.len(), "Backend returned a bare array; deriving page totals");
                SearchPage {
                    total_pages: page_count(cars.len(), per_page),
                    total_results: cars.len() as u32,
                    cars,
                }
            }
        };

        tracing::info!(
            page,
            results = search_page.cars.len(),
            total_results = search_page.total_results,
            "Search complete"
        );
        Ok(search_page)
    }

    pub async fn listing(&self, id: &str) -> Result<Listing, ClientError> {
        let mut url = endpoint_url(&self.base_url, "User/cars")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.clone()))?
            .push(id);
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    pub async fn reviews(&self) -> Result<Vec<Review>, ClientError> {
        let url = endpoint_url(&self.base_url, "User/reviews")?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    pub async fn blogs(&self, search: &str) -> Result<Vec<BlogPost>, ClientError> {
        let mut url = endpoint_url(&self.base_url, "User/blogs")?;
        if !search.trim().is_empty() {
            url.query_pairs_mut().append_pair("search", search.trim());
        }
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    /// Loads every dropdown's choices. Each category is fetched independently;
    /// a failure leaves that list empty and never affects the others.
    pub async fn filter_options(&self) -> FilterOptions {
        let (years, mileage_ranges, price_ranges, features, vehicle_types, fuel_types) = futures::join!(
            self.option_list("years", "Any year"),
            self.option_list("mileage-ranges", "Any mileage"),
            self.option_list("price-ranges", "Any price"),
            self.option_list("features", "Any feature"),
            self.option_list("vehicle-types", "Any vehicle type"),
            self.option_list("fuel-types", "Any fuel type"),
        );

        FilterOptions { years, mileage_ranges, price_ranges, features, vehicle_types, fuel_types }
    }

    async fn option_list(&self, category: &str, any_label: &str) -> Vec<FilterOption> {
        let fetched: Result<Vec<RawOption>, ClientError> = async {
            let url = endpoint_url(&self.base_url, &format!("User/cars/{category}"))?;
            let response = self.client.get(url).send().await?;
            read_json(response).await
        }
        .await;

        match fetched {
            Ok(raw) => {
                let mut options = Vec::with_capacity(raw.len() + 1);
                options.push(FilterOption::any(any_label));
                options.extend(raw.into_iter().map(FilterOption::from));
                options
            }
            Err(e) => {
                tracing::warn!(category, error = %e, "Failed to load filter options");
                Vec::new()
            }
        }
    }
}

/// Keeps the last successfully loaded filter options for a fixed lifespan,
/// so page renders don't reload every dropdown on each request.
pub struct FilterOptionsCache {
    inner: Mutex<TimedCache<(), FilterOptions>>,
}

impl FilterOptionsCache {
    pub fn new(ttl_secs: u64) -> Self {
        FilterOptionsCache { inner: Mutex::new(TimedCache::with_lifespan(ttl_secs)) }
    }

    pub async fn get_or_load(&self, api: &ListingApi) -> FilterOptions {
        let mut cache = self.inner.lock().await;
        if let Some(options) = cache.cache_get(&()) {
            return options.clone();
        }

        let options = api.filter_options().await;
        // A load where every category failed is not worth keeping
        if options != FilterOptions::default() {
            cache.cache_set((), options.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(11, 5), 3);
        assert_eq!(page_count(3, 0), 3);
    }

    #[test]
    fn endpoint_url_tolerates_slashes() {
        let url = endpoint_url("http://localhost:5000/api/", "/User/cars").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/User/cars");
        assert!(endpoint_url("not a url", "User/cars").is_err());
    }
}
