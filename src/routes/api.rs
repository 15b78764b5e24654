// Handlers for the public JSON API

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::Json,
};
use axum_extra::extract::CookieJar;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::AppResult,
    filters::{FilterCriteria, FilterOverride},
    listing_api::ListingApi,
    models::{BlogPost, FilterOptions, Listing, ListingId, ReviewSummary},
    prediction::{PredictionMetadata, PredictionRequest, PredictionResponse},
    presenter::{PageItem, page_window, sort_listings},
    routes::requested_page,
    wishlist::{CookieStorage, WishlistStore},
};

// --- Response Wrappers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    criteria: FilterCriteria,
    page: u32,
    cars: Vec<Listing>,
    total_pages: u32,
    total_results: u32,
    page_window: Vec<PageItem>,
}

#[derive(Serialize)]
pub struct WishlistBody {
    ids: Vec<ListingId>,
    count: usize,
}

impl WishlistBody {
    fn from_store(store: &WishlistStore<CookieStorage>) -> Self {
        WishlistBody { ids: store.entries().to_vec(), count: store.len() }
    }
}

// --- Request Structs ---

#[derive(Deserialize)]
pub struct BlogQuery {
    #[serde(default)]
    search: String,
}

// --- Catalogue ---

pub async fn get_filter_options(State(app_state): State<AppState>) -> Json<FilterOptions> {
    Json(app_state.filter_options.get_or_load(&app_state.listings).await)
}

/// `GET /api/cars`: criteria come from the query string in the same shape the
/// search form submits (`priceRange=10000-20000`, repeated `features`, ...).
pub async fn search_cars(
    State(app_state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<SearchResults>> {
    let mut criteria = FilterCriteria::default();
    criteria.apply_override(FilterOverride::from_pairs(&pairs)?)?;
    criteria.validate()?;
    let page = requested_page(&pairs);

    let mut results = app_state.listings.search(&criteria, page, app_state.settings.page_size).await?;
    sort_listings(&mut results.cars, criteria.sort_by);

    Ok(Json(SearchResults {
        page_window: page_window(page, results.total_pages),
        criteria,
        page,
        cars: results.cars,
        total_pages: results.total_pages,
        total_results: results.total_results,
    }))
}

pub async fn get_car(State(app_state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Listing>> {
    tracing::info!(id = %id, "Fetching listing");
    Ok(Json(app_state.listings.listing(&id).await?))
}

pub async fn get_reviews(State(app_state): State<AppState>) -> AppResult<Json<ReviewSummary>> {
    let reviews = app_state.listings.reviews().await?;
    Ok(Json(ReviewSummary::new(reviews)))
}

pub async fn get_blogs(
    State(app_state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(app_state.listings.blogs(&query.search).await?))
}

// --- Wishlist ---

pub async fn get_wishlist(jar: CookieJar) -> (CookieJar, Json<WishlistBody>) {
    let store = WishlistStore::open(CookieStorage::new(jar));
    let body = WishlistBody::from_store(&store);
    (store.into_storage().into_jar(), Json(body))
}

pub async fn add_to_wishlist(jar: CookieJar, Path(id): Path<String>) -> (CookieJar, Json<WishlistBody>) {
    let mut store = WishlistStore::open(CookieStorage::new(jar));
    store.add(id);
    let body = WishlistBody::from_store(&store);
    (store.into_storage().into_jar(), Json(body))
}

pub async fn remove_from_wishlist(jar: CookieJar, Path(id): Path<String>) -> (CookieJar, Json<WishlistBody>) {
    let mut store = WishlistStore::open(CookieStorage::new(jar));
    store.remove(&id);
    let body = WishlistBody::from_store(&store);
    (store.into_storage().into_jar(), Json(body))
}

pub async fn clear_wishlist(jar: CookieJar) -> (CookieJar, Json<WishlistBody>) {
    let mut store = WishlistStore::open(CookieStorage::new(jar));
    store.clear();
    let body = WishlistBody::from_store(&store);
    (store.into_storage().into_jar(), Json(body))
}

/// Resolves wishlist ids to listings. Ids the backend no longer knows are skipped.
pub(crate) async fn wishlist_listings(api: &ListingApi, ids: &[ListingId]) -> Vec<Listing> {
    let fetched = join_all(ids.iter().map(|id| api.listing(id))).await;
    ids.iter()
        .zip(fetched)
        .filter_map(|(id, result)| match result {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Skipping wishlist entry");
                None
            }
        })
        .collect()
}

// --- Price prediction ---

pub async fn get_prediction_metadata(State(app_state): State<AppState>) -> AppResult<Json<PredictionMetadata>> {
    Ok(Json(app_state.prediction.metadata().await?))
}

pub async fn predict_price(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    let prediction = app_state.prediction.predict(&request).await?;
    tracing::info!(
        manufacturer = %request.manufacturer,
        model = %request.model,
        predicted_price = prediction.predicted_price,
        "Price predicted"
    );
    Ok(Json(prediction))
}
