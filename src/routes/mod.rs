// Route definitions

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    admin_api::{AdminResource, CarInput, Color, Feature, NewAllocation, Seller, Showroom},
};

mod admin;
mod api;
mod pages;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/filter-options", get(api::get_filter_options))
        .route("/cars", get(api::search_cars))
        .route("/cars/:id", get(api::get_car))
        .route("/reviews", get(api::get_reviews))
        .route("/blogs", get(api::get_blogs))
        .route("/wishlist", get(api::get_wishlist).delete(api::clear_wishlist))
        .route("/wishlist/:id", post(api::add_to_wishlist).delete(api::remove_from_wishlist))
        .route("/prediction/metadata", get(api::get_prediction_metadata))
        .route("/prediction", post(api::predict_price))
        .nest("/admin", admin_router());

    Router::new()
        .route("/", get(pages::landing_page))
        .route("/cars", get(pages::cars_page))
        .route("/cars/:id", get(pages::car_detail_page))
        .route("/wishlist", get(pages::wishlist_page))
        .route("/wishlist/:id/toggle", post(pages::toggle_wishlist))
        .nest("/api", api_router)
        .with_state(app_state)
}

fn admin_router() -> Router<AppState> {
    let cars = resource_routes::<CarInput>().route("/export", get(admin::export_inventory));

    Router::new()
        .nest("/cars", cars)
        .nest("/colors", resource_routes::<Color>())
        .nest("/features", resource_routes::<Feature>())
        .nest("/sellers", resource_routes::<Seller>())
        .nest("/showrooms", resource_routes::<Showroom>())
        .nest("/allocations", resource_routes::<NewAllocation>())
        .route("/inventory", get(admin::inventory_page))
}

// list/create on the collection, update/delete on one record
fn resource_routes<R: AdminResource>() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::list::<R>).post(admin::create::<R>))
        .route("/:id", delete(admin::delete::<R>).put(admin::update::<R>))
}

/// `page` query parameter, 1-based. Missing or malformed values mean page 1.
pub(crate) fn requested_page(pairs: &[(String, String)]) -> u32 {
    pairs
        .iter()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}
