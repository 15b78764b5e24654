mod common;

use axum::{
    Json, Router,
    extract::RawQuery,
    http::StatusCode,
    routing::get,
};
use common::{api, car, cars, serve};
use dealership_rust::{error::ClientError, filters::FilterCriteria};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn bare_array_response_gets_derived_totals() {
    let base = serve(Router::new().route("/api/User/cars", get(|| async { Json(cars(11)) }))).await;

    let page = api(&base).search(&FilterCriteria::default(), 1, 5).await.unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_results, 11);
    assert_eq!(page.cars.len(), 11);
}

#[tokio::test]
async fn paged_envelope_is_taken_as_is() {
    let base = serve(Router::new().route(
        "/api/User/cars",
        get(|| async { Json(json!({ "cars": [car("a", 9000.0)], "totalPages": 7, "totalResults": 31 })) }),
    ))
    .await;

    let page = api(&base).search(&FilterCriteria::default(), 2, 5).await.unwrap();
    assert_eq!((page.total_pages, page.total_results), (7, 31));
    assert_eq!(page.cars[0].id, "a");
}

#[tokio::test]
async fn criteria_are_sent_as_query_parameters() {
    let seen: Arc<Mutex<Option<String>>> = Arc::default();
    let recorder = seen.clone();
    let base = serve(Router::new().route(
        "/api/User/cars",
        get(move |RawQuery(query): RawQuery| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = query;
                Json(json!([]))
            }
        }),
    ))
    .await;

    let mut criteria = FilterCriteria { keyword: "golf".into(), ..Default::default() };
    criteria.features = vec!["ABS".into(), "GPS".into()];
    criteria.set_price_range("10000-20000").unwrap();
    criteria.sort_by = "price-desc".parse().unwrap();
    api(&base).search(&criteria, 2, 5).await.unwrap();

    let query = seen.lock().unwrap().clone().unwrap();
    assert!(query.starts_with("keyword=golf&paymentType=cash&priceFrom=10000&priceTo=20000"), "{query}");
    assert!(query.contains("features=ABS&features=GPS"), "{query}");
    assert!(query.ends_with("page=2&perPage=5"), "{query}");
    assert!(!query.contains("sortBy"), "{query}");
    assert!(!query.contains("vatDeduction"), "{query}");
}

#[tokio::test]
async fn backend_message_is_surfaced() {
    let base = serve(Router::new().route(
        "/api/User/cars",
        get(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid mileage filter" }))) }),
    ))
    .await;

    let err = api(&base).search(&FilterCriteria::default(), 1, 5).await.unwrap_err();
    match &err {
        ClientError::Backend { status, message } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "Invalid mileage filter");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Invalid mileage filter");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let err = api(common::UNREACHABLE).search(&FilterCriteria::default(), 1, 5).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn one_failing_option_list_does_not_affect_the_others() {
    let base = serve(
        Router::new()
            .route("/api/User/cars/years", get(|| async { Json(json!(["2021", 2022])) }))
            .route(
                "/api/User/cars/price-ranges",
                get(|| async { Json(json!([{ "value": "0-10000", "label": "Up to 10,000" }])) }),
            )
            .route("/api/User/cars/mileage-ranges", get(|| async { Json(json!([])) }))
            .route("/api/User/cars/features", get(|| async { Json(json!(["ABS"])) }))
            .route("/api/User/cars/vehicle-types", get(|| async { Json(json!(["SUV"])) }))
            .route("/api/User/cars/fuel-types", get(|| async { StatusCode::INTERNAL_SERVER_ERROR })),
    )
    .await;

    let options = api(&base).filter_options().await;
    assert!(options.fuel_types.is_empty());

    let years: Vec<&str> = options.years.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(years, vec!["Any year", "2021", "2022"]);
    assert_eq!(options.years[0].value, "");
    assert_eq!(options.price_ranges[1].value, "0-10000");
    assert_eq!(options.mileage_ranges.len(), 1);
    assert_eq!(options.features.len(), 2);
}

#[tokio::test]
async fn listing_detail_and_missing_listing() {
    let base = serve(Router::new().route(
        "/api/User/cars/:id",
        get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
            if id == "known" {
                Ok(Json(car("known", 15000.0)))
            } else {
                Err((StatusCode::NOT_FOUND, Json(json!({ "message": "Car not found" }))))
            }
        }),
    ))
    .await;

    let listing = api(&base).listing("known").await.unwrap();
    assert_eq!(listing.title(), "Skoda Fabia");

    let err = api(&base).listing("gone").await.unwrap_err();
    assert!(matches!(err, ClientError::Backend { status, .. } if status == StatusCode::NOT_FOUND));
}
