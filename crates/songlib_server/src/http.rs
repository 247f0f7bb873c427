//! axum host for the song API.
//!
//! Every request goes through one fallback handler; routing itself lives in
//! `songlib_api`. Catalog calls are synchronous and run on the blocking pool.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use log::error;
use serde_json::json;
use songlib_api::{ApiResponse, SongApi};
use songlib_core::SqliteSongRepository;
use std::sync::Arc;

pub type SharedApi = Arc<SongApi<SqliteSongRepository>>;

/// Builds the router serving the whole song API.
pub fn router(api: SharedApi) -> Router {
    Router::new().fallback(dispatch).with_state(api)
}

async fn dispatch(
    State(api): State<SharedApi>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let method = method.as_str().to_string();
    let path = uri.path().to_string();

    match tokio::task::spawn_blocking(move || api.handle(&method, &path, &body)).await {
        Ok(response) => into_http_response(response),
        Err(err) => {
            error!("event=api_dispatch module=server status=error error={err}");
            into_http_response(ApiResponse {
                status: 500,
                body: json!({ "error": "Internal server error" }),
            })
        }
    }
}

/// Converts an adapter response into an HTTP response with a JSON body.
pub fn into_http_response(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::into_http_response;
    use axum::http::StatusCode;
    use serde_json::json;
    use songlib_api::ApiResponse;

    #[test]
    fn adapter_status_is_preserved() {
        let response = into_http_response(ApiResponse {
            status: 404,
            body: json!({ "error": "Route not found" }),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[test]
    fn invalid_status_falls_back_to_internal_error() {
        let response = into_http_response(ApiResponse {
            status: 42,
            body: json!(null),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
