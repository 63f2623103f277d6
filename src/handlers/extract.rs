//! Request extractors whose rejections render as `AppError`
//!
//! Drop-in replacements for `axum::Json`, `Path` and `Query`: a body or
//! parameter that fails to deserialize comes back as a `VALIDATION_ERROR`
//! envelope instead of axum's plain-text rejection.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::registrations::request::{
        CreateRegistrationRequest, ListRegistrationsQuery,
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::{get, post},
    };
    use tower::ServiceExt;

    async fn create(Json(payload): Json<CreateRegistrationRequest>) -> Json<i64> {
        Json(payload.event_id)
    }

    async fn show(Path(id): Path<i64>) -> Json<i64> {
        Json(id)
    }

    async fn index(Query(query): Query<ListRegistrationsQuery>) -> Json<Option<u32>> {
        Json(query.page)
    }

    fn app() -> Router {
        Router::new()
            .route("/event-registrations", post(create).get(index))
            .route("/event-registrations/{id}", get(show))
    }

    async fn send(request: Request<Body>) -> (StatusCode, String, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/event-registrations")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_renders_validation_envelope() {
        let (status, content_type, body) = send(post_json("{}")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(content_type.starts_with("application/json"));
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["event_id"][0], "The event_id field is required");
    }

    #[tokio::test]
    async fn test_wrong_type_is_reported_on_its_field() {
        let (status, _, body) = send(post_json(r#"{"event_id":"abc"}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["errors"]["event_id"][0].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_and_content_type() {
        let (status, _, body) = send(post_json("{not json")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["errors"]["body"][0].is_string());

        let request = Request::post("/event-registrations")
            .body(Body::from(r#"{"event_id":1}"#))
            .unwrap();
        let (_, _, body) = send(request).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let (status, _, body) = send(post_json(r#"{"event_id":7}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, 7);
    }

    #[tokio::test]
    async fn test_bad_path_and_query_params() {
        let request = Request::get("/event-registrations/abc").body(Body::empty()).unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let request = Request::get("/event-registrations?page=first")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["errors"].is_object());
    }
}
