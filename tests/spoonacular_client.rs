//! `SpoonacularClient` against a local HTTP server standing in for the
//! recipe API.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

use cooking_list::api::{RecipeApi, SpoonacularClient, SEARCH_PATH};
use cooking_list::error::FetchError;
use cooking_list::pagination::PageRequest;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind local server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn search(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("apiKey").map(String::as_str) != Some("secret") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "status": "failure" })));
    }
    let offset: i64 = params["offset"].parse().unwrap();
    let number: i64 = params["number"].parse().unwrap();
    let results: Vec<Value> = (offset..offset + number)
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Recipe {}", id),
                "image": format!("https://img.example/{}.jpg", id),
                "imageType": "jpg"
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "results": results, "offset": offset, "number": number, "totalResults": 5226 })),
    )
}

#[tokio::test]
async fn page_decodes_from_search_response() {
    let base_url = serve(Router::new().route(SEARCH_PATH, get(search))).await;
    let client = SpoonacularClient::new(base_url, "secret");

    let recipes = client.fetch_page(PageRequest::new(2)).await.unwrap();

    let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    assert_eq!(ids, (10..20).collect::<Vec<_>>());
    assert_eq!(recipes[0].title, "Recipe 10");
    assert_eq!(recipes[0].image, "https://img.example/10.jpg");
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let router = Router::new().route(
        SEARCH_PATH,
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded") }),
    );
    let client = SpoonacularClient::new(serve(router).await, "secret");

    let result = client.fetch_page(PageRequest::new(1)).await;

    assert!(matches!(result, Err(FetchError::Status(500))), "{:?}", result);
}

#[tokio::test]
async fn rejected_key_maps_to_status() {
    let base_url = serve(Router::new().route(SEARCH_PATH, get(search))).await;
    let client = SpoonacularClient::new(base_url, "wrong");

    let result = client.fetch_page(PageRequest::new(1)).await;

    assert!(matches!(result, Err(FetchError::Status(401))), "{:?}", result);
}

#[tokio::test]
async fn malformed_body_is_an_http_error() {
    let router = Router::new().route(SEARCH_PATH, get(|| async { "not json" }));
    let client = SpoonacularClient::new(serve(router).await, "secret");

    let result = client.fetch_page(PageRequest::new(1)).await;

    assert!(matches!(result, Err(FetchError::Http(_))), "{:?}", result);
}
