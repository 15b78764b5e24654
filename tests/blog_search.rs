mod common;

use axum::{Json, Router, extract::Query, routing::get};
use common::{api, serve};
use dealership_rust::blog_search::BlogSearch;
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

#[tokio::test]
async fn only_the_settled_query_reaches_the_backend() {
    let queries: Arc<Mutex<Vec<String>>> = Arc::default();
    let recorder = queries.clone();
    let base = serve(Router::new().route(
        "/api/User/blogs",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let recorder = recorder.clone();
            async move {
                let search = params.get("search").cloned().unwrap_or_default();
                recorder.lock().unwrap().push(search.clone());
                Json(json!([{ "id": "b1", "title": format!("Buying a {search}") }]))
            }
        }),
    ))
    .await;

    let search = BlogSearch::new(api(&base), Duration::from_millis(100));
    let mut results = search.subscribe();
    search.input("s");
    search.input("su");
    search.input("suv");

    tokio::time::timeout(Duration::from_secs(2), results.changed()).await.unwrap().unwrap();
    let latest = results.borrow().clone();
    assert_eq!(latest.query, "suv");
    assert_eq!(latest.posts[0].title, "Buying a suv");
    assert!(latest.error.is_none());
    assert_eq!(*queries.lock().unwrap(), vec!["suv".to_string()]);
}

#[tokio::test]
async fn failed_search_publishes_an_error() {
    let search = BlogSearch::new(api(common::UNREACHABLE), Duration::from_millis(10));
    let mut results = search.subscribe();
    search.input("hybrid");

    tokio::time::timeout(Duration::from_secs(5), results.changed()).await.unwrap().unwrap();
    let latest = results.borrow().clone();
    assert_eq!(latest.query, "hybrid");
    assert!(latest.posts.is_empty());
    assert!(latest.error.is_some());
}
