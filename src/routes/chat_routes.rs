use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::errors::AppError;
use crate::models::ChatRequest;
use crate::service::chat_service::ChatService;
use crate::stream::{DATA_STREAM_HEADER, DATA_STREAM_VERSION};

/// JSON body for pre-stream failures. Once streaming has begun, failures
/// surface as an aborted body instead; the browser runtime treats a stream
/// that ends without a done frame as a failure.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

/// POST `/api/chat` — runs one chat turn and streams the reply back as
/// newline-delimited data-stream frames.
///
/// The body is parsed by hand rather than through the `Json` extractor so a
/// malformed request produces the pinned `500 {error, details}` shape the
/// browser runtime expects, not an extractor rejection.
pub async fn chat_handler(State(svc): State<ChatService>, body: Bytes) -> Response {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(&AppError::invalid_request(e.to_string()));
        }
    };

    match svc.stream_chat(request).await {
        Ok(frames) => (
            [
                (CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
                (
                    HeaderName::from_static(DATA_STREAM_HEADER),
                    HeaderValue::from_static(DATA_STREAM_VERSION),
                ),
            ],
            Body::from_stream(frames),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET `/healthz` — liveness probe for the fronting deployment.
pub async fn healthz_handler() -> &'static str {
    "ok"
}

fn error_response(err: &AppError) -> Response {
    error!("chat request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: "Failed to process chat request", details: err.to_string() }),
    )
        .into_response()
}
