//! Extractors whose rejections are [`ApiError`]s
//!
//! `ApiJson<T>` works like `axum::Json<T>`, `ApiPath<T>` like `Path<T>` and
//! `ApiQuery<T>` like `Query<T>`, but a malformed request is answered with
//! the standard error body instead of axum's plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::interfaces::http::error::ApiError;

/// JSON body extractor.
///
/// # Usage
///
/// ```ignore
/// async fn handler(ApiJson(body): ApiJson<CreateUserRequest>) {
///     // `body` deserialized successfully
/// }
/// ```
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Path parameters extractor
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct TestBody {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: Option<u32>,
    }

    async fn create(ApiJson(body): ApiJson<TestBody>) -> String {
        body.name
    }

    async fn list(ApiQuery(paging): ApiQuery<Paging>) -> String {
        paging.page.unwrap_or(1).to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/test", post(create))
            .route("/list", get(list))
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let resp = app().oneshot(json_request(r#"{"name": "Alice"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_is_an_api_error() {
        let resp = app().oneshot(json_request("not json")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err = resp.extensions().get::<ApiError>().unwrap();
        assert_eq!(err.status_code(), 400);
        assert!(err.is_operational());
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let resp = app().oneshot(json_request(r#"{"age": 3}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn bad_query_is_a_bad_request() {
        let req = Request::builder()
            .uri("/list?page=first")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.extensions().get::<ApiError>().is_some());
    }
}
