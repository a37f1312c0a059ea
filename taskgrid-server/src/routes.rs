//! Request routing and response shaping

use std::net::SocketAddr;

use http_body_util::BodyExt;
use http_body_util::Full;
use http_body_util::Limited;
use http_body_util::LengthLimitError;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Body;
use hyper::body::Bytes;
use hyper::header;
use hyper::header::HeaderMap;
use hyper::header::HeaderValue;
use serde::Serialize;
use taskgrid_lib::ApiResponse;

use crate::config::CorsConfig;
use crate::error::AppError;
use crate::handlers;
use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api";

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

pub type HttpResponse = Response<Full<Bytes>>;

// =============================================================================
// Entry Point
// =============================================================================

/// Handles one request from `remote`.
///
/// Preflight `OPTIONS` requests are answered before rate limiting. Every
/// other request is counted, then routed. All responses carry the CORS
/// headers.
pub async fn handle<B>(state: &AppState, req: Request<B>, remote: SocketAddr) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    log::info!("{} {}", req.method(), target);

    if req.method() == Method::OPTIONS {
        let mut response = empty(StatusCode::NO_CONTENT);
        apply_preflight(response.headers_mut(), req.headers());
        apply_cors(response.headers_mut(), &state.config.cors);
        return response;
    }

    let decision = state.limiter.check(&remote.ip().to_string()).await;
    let result = if decision.limited {
        Err(AppError::RateLimited)
    } else {
        route(state, req, &target).await
    };

    let mut response = result.unwrap_or_else(|e| error_response(&e));
    apply_rate_limit(response.headers_mut(), state, &decision);
    apply_cors(response.headers_mut(), &state.config.cors);
    response
}

async fn route<B>(state: &AppState, req: Request<B>, target: &str) -> Result<HttpResponse, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let not_found = || AppError::not_found(format!("Route not found: {} {}", method, target));

    let Some(rest) = req.uri().path().strip_prefix(API_PREFIX) else {
        return Err(not_found());
    };
    let segments = split_path(rest).ok_or_else(not_found)?;
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let query = req.uri().query().and_then(|q| query_param(q, "query"));

    match (&method, segments.as_slice()) {
        (&Method::GET, ["tasks"]) => json(&handlers::get_tasks(state).await),
        (&Method::GET, ["tasks", id]) => json(&handlers::get_task_row(state, id).await?),
        (&Method::PATCH, ["tasks", row_id, "cells", column_id]) => {
            let body = read_body(req).await?;
            json(&handlers::update_cell(state, row_id, column_id, &body).await?)
        }
        (&Method::GET, ["users"]) => json(&handlers::get_users(state, query.as_deref()).await?),
        (&Method::GET, ["users", id]) => json(&handlers::get_user(state, id).await?),
        _ => Err(not_found()),
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Splits `/a/b/` into decoded segments. Returns `None` on bad escapes.
fn split_path(path: &str) -> Option<Vec<String>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).ok().map(|c| c.into_owned()))
        .collect()
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

async fn read_body<B>(req: Request<B>) -> Result<Bytes, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                AppError::PayloadTooLarge
            } else {
                AppError::validation("Invalid request body", "body", e.to_string())
            }
        })
}

// =============================================================================
// Response Helpers
// =============================================================================

fn empty(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn json_with_status<T: Serialize>(status: StatusCode, body: &T) -> Result<HttpResponse, AppError> {
    let bytes = serde_json::to_vec(body)?;
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    Ok(response)
}

/// Wraps `data` in the success envelope.
fn json<T: Serialize>(data: &T) -> Result<HttpResponse, AppError> {
    json_with_status(StatusCode::OK, &ApiResponse::success(data))
}

fn error_response(error: &AppError) -> HttpResponse {
    if error.is_operational() {
        log::info!("operational error: {}", error);
    } else {
        log::error!("unexpected error: {}", error);
    }

    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_with_status(status, &error.to_response::<()>()).unwrap_or_else(|e| {
        log::error!("failed to encode error response: {}", e);
        empty(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

fn apply_rate_limit(headers: &mut HeaderMap, state: &AppState, decision: &RateLimitDecision) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(state.limiter.config().max));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_epoch_secs()));
}

fn apply_cors(headers: &mut HeaderMap, cors: &CorsConfig) {
    match HeaderValue::from_str(&cors.origin) {
        Ok(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(e) => log::warn!("invalid CORS origin {:?}: {}", cors.origin, e),
    }
    if cors.origin != "*" {
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
    if cors.credentials {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

fn apply_preflight(headers: &mut HeaderMap, request: &HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
    );
    let allowed = request
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("Content-Type"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allowed);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(0u32));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ServerConfig;

    fn state(config: ServerConfig) -> AppState {
        AppState::new(config).unwrap()
    }

    fn remote() -> SocketAddr {
        "10.0.0.1:5000".parse().unwrap()
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_split_path() {
        assert_eq!(
            split_path("/tasks/ID%201/cells/x/"),
            Some(vec!["tasks".into(), "ID 1".into(), "cells".into(), "x".into()])
        );
        assert_eq!(split_path("/"), Some(vec![]));
    }

    #[tokio::test]
    async fn test_get_tasks_envelope_and_headers() {
        let state = state(ServerConfig::default());
        let response = handle(&state, request(Method::GET, "/api/tasks", ""), remote()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-ratelimit-limit"], "100");
        assert_eq!(headers["x-ratelimit-remaining"], "99");
        assert!(headers.contains_key("x-ratelimit-reset"));

        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 5);
        assert_eq!(json["data"]["columns"][3]["type"], "multi_user");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = state(ServerConfig::default());
        let response = handle(&state, request(Method::GET, "/api/nope?x=1", ""), remote()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "Route not found: GET /api/nope?x=1");
    }

    #[tokio::test]
    async fn test_invalid_query_is_400() {
        let state = state(ServerConfig::default());
        let response = handle(
            &state,
            request(Method::GET, "/api/users?query=a%3Bb", ""),
            remote(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid search query");
        assert!(json["errors"]["query"].is_string());
    }

    #[tokio::test]
    async fn test_patch_cell() {
        let state = state(ServerConfig::default());
        let response = handle(
            &state,
            request(
                Method::PATCH,
                "/api/tasks/ID-2/cells/status",
                r#"{"value":"done"}"#,
            ),
            remote(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["row"]["cells"]["status"]["value"], "done");

        let response = handle(
            &state,
            request(Method::PATCH, "/api/tasks/ID-2/cells/status", "{}"),
            remote(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let state = state(ServerConfig::default());
        let body = format!(r#"{{"value":"{}"}}"#, "x".repeat(MAX_BODY_BYTES));
        let response = handle(
            &state,
            request(Method::PATCH, "/api/tasks/ID-1/cells/summary", &body),
            remote(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json["statusCode"], 413);
        assert_eq!(json["message"], "Request body too large");

        let row = state.tasks.row("ID-1").await.unwrap();
        assert_eq!(row.cell("summary").unwrap().as_text(), Some("400 pix for mura"));
    }

    #[tokio::test]
    async fn test_preflight() {
        let config = ServerConfig::default().with_cors(CorsConfig {
            origin: "http://localhost:5173".into(),
            credentials: true,
        });
        let state = state(config);
        let response = handle(&state, request(Method::OPTIONS, "/api/tasks", ""), remote()).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert!(headers.contains_key("access-control-allow-methods"));
        assert!(!headers.contains_key("x-ratelimit-limit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_after_max() {
        let state = state(ServerConfig::default().with_rate_limit(2, Duration::from_secs(60)));

        for _ in 0..2 {
            let response = handle(&state, request(Method::GET, "/api/users", ""), remote()).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = handle(&state, request(Method::GET, "/api/users", ""), remote()).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

        let json = body_json(response).await;
        assert_eq!(json["message"], "Too many requests, please try again later");
    }
}
