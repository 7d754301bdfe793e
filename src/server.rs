use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::aggregate::NutritionDocument;

pub type SharedDocument = Arc<NutritionDocument>;

pub async fn get_drinks(State(doc): State<SharedDocument>) -> impl IntoResponse {
    Json(doc.as_ref().clone())
}

pub async fn get_drink(State(doc): State<SharedDocument>, Path(id): Path<String>) -> impl IntoResponse {
    match doc.drink(&id) {
        Some(drink) => Json(drink.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Drink not found: {id}")).into_response(),
    }
}

/// Read-only API over one extracted document.
pub fn router(doc: SharedDocument) -> Router {
    Router::new()
        .route("/drinks", get(get_drinks))
        .route("/drinks/{id}", get(get_drink))
        .with_state(doc)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FlatNutritionRecord, Nutrition};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn shared() -> SharedDocument {
        let record = FlatNutritionRecord {
            name: "Flat White".into(),
            raw_name: "Flat White".into(),
            size: "Tall".into(),
            milk_type: "Standard".into(),
            nutrition: Nutrition::default(),
        };
        Arc::new(crate::aggregate::aggregate(&[record], "test"))
    }

    #[tokio::test]
    async fn known_drink_is_returned() {
        let resp = get_drink(State(shared()), Path("flat_white".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_drink_is_not_found() {
        let resp = get_drink(State(shared()), Path("mocha".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn whole_document_is_served() {
        let resp = get_drinks(State(shared())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn router_serves_a_drink_with_cors_headers() {
        let req = Request::builder()
            .uri("/drinks/flat_white")
            .header("origin", "http://example.test")
            .body(Body::empty())
            .unwrap();
        let resp = router(shared()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let drink: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(drink["id"], "flat_white");
        assert_eq!(drink["sizes"][0]["size"], "Tall");
    }

    #[tokio::test]
    async fn router_answers_unknown_paths_and_ids_with_not_found() {
        for uri in ["/drinks/mocha", "/menu"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let resp = router(shared()).oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
