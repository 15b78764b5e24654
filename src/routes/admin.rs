// Back-office handlers. The caller's bearer token is forwarded to the backend,
// which decides whether the request is allowed.

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    admin_api::{AdminResource, CarInput},
    auth_middleware::AdminToken,
    error::AppResult,
    export::inventory_csv,
    filters::SortBy,
    listing_api::page_count,
    models::Listing,
    presenter::{PageItem, page_window, paginate, sort_listings},
};

pub const ADMIN_PAGE_SIZE: u32 = 10;

// --- Generic CRUD ---

pub async fn list<R: AdminResource>(
    State(app_state): State<AppState>,
    token: AdminToken,
) -> AppResult<Json<Vec<R::Record>>> {
    let records = app_state.admin.list::<R>(token.as_str()).await?;
    tracing::debug!(resource = R::NAME, count = records.len(), "Listed records");
    Ok(Json(records))
}

pub async fn create<R: AdminResource>(
    State(app_state): State<AppState>,
    token: AdminToken,
    JsonExtract(payload): JsonExtract<R>,
) -> AppResult<(StatusCode, Json<R::Record>)> {
    let record = app_state.admin.create(token.as_str(), &payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: AdminResource>(
    State(app_state): State<AppState>,
    token: AdminToken,
    Path(id): Path<String>,
    JsonExtract(payload): JsonExtract<R>,
) -> AppResult<Json<R::Record>> {
    Ok(Json(app_state.admin.update(token.as_str(), &id, &payload).await?))
}

pub async fn delete<R: AdminResource>(
    State(app_state): State<AppState>,
    token: AdminToken,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    app_state.admin.delete::<R>(token.as_str(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Inventory ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    sort_by: Option<SortBy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPage {
    cars: Vec<Listing>,
    page: u32,
    total_pages: u32,
    total_results: u32,
    page_window: Vec<PageItem>,
}

/// The backend returns the whole inventory at once; sorting and paging happen here.
pub async fn inventory_page(
    State(app_state): State<AppState>,
    token: AdminToken,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<InventoryPage>> {
    let mut cars = app_state.admin.list::<CarInput>(token.as_str()).await?;
    if let Some(sort_by) = query.sort_by {
        sort_listings(&mut cars, sort_by);
    }

    let per_page = query.per_page.unwrap_or(ADMIN_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total_pages = page_count(cars.len(), per_page);

    Ok(Json(InventoryPage {
        cars: paginate(&cars, page, per_page).to_vec(),
        page,
        total_pages,
        total_results: cars.len() as u32,
        page_window: page_window(page, total_pages),
    }))
}

pub async fn export_inventory(
    State(app_state): State<AppState>,
    token: AdminToken,
) -> AppResult<impl IntoResponse> {
    let cars = app_state.admin.list::<CarInput>(token.as_str()).await?;
    let body = inventory_csv(&cars)?;
    tracing::info!(rows = cars.len(), "Exported inventory");

    let filename = format!("inventory_{}.csv", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    ))
}
