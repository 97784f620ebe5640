//! Request guards
//!
//! Order on every request: blocklist first, then rate limiter, then the
//! handler; telemetry observes the result off the response path. Both
//! guards fail open — a broken guard logs and admits rather than taking
//! the API down.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;

use crate::models::common::ErrorResponse;
use crate::services::{ip_blocklist, rate_limiter::RateLimitDecision, telemetry};
use crate::AppState;

/// Client address, preferring the proxy-set headers the deployment puts in
/// front of us.
pub fn client_ip(req: &Request<Body>) -> String {
    let from_header = |name: &str| -> Option<String> {
        req.headers()
            .get(name)?
            .to_str()
            .ok()?
            .split(',')
            .next()
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
    };

    from_header("x-forwarded-for")
        .or_else(|| from_header("x-real-ip"))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let endpoint = req.uri().path().to_string();
    let method = req.method().as_str().to_string();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let start = Instant::now();

    // Blocked clients are rejected before rate limiting or business logic
    if ip_blocklist::is_blocked(&state.db, &ip).await {
        let response = (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Access denied".to_string(),
            }),
        )
            .into_response();
        record(&state, &ip, &endpoint, &method, user_agent, &response, start);
        return response;
    }

    let decision = state
        .rate_limiter
        .check(&state.db, &ip, &endpoint, &method)
        .await;

    if !decision.allowed {
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response();
        apply_rate_limit_headers(&mut response, &decision);
        record(&state, &ip, &endpoint, &method, user_agent, &response, start);
        return response;
    }

    let mut response = next.run(req).await;
    if decision.limit > 0 {
        apply_rate_limit_headers(&mut response, &decision);
    }

    record(&state, &ip, &endpoint, &method, user_agent, &response, start);
    response
}

fn apply_rate_limit_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    let mut set = |name: &'static str, value: String| {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    };

    set("x-ratelimit-limit", decision.limit.to_string());
    set("x-ratelimit-remaining", decision.remaining.to_string());
    set("x-ratelimit-reset", decision.reset_time.to_string());
    if let Some(retry_after) = decision.retry_after {
        set("retry-after", retry_after.to_string());
    }
}

fn record(
    state: &AppState,
    ip: &str,
    endpoint: &str,
    method: &str,
    user_agent: Option<String>,
    response: &Response,
    start: Instant,
) {
    telemetry::record(
        state.db.clone(),
        telemetry::RequestEntry {
            ip_address: ip.to_string(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            status_code: response.status().as_u16(),
            latency_ms: start.elapsed().as_millis() as i64,
            user_agent,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_client_ip_from_forwarded_for() {
        let req = request_with_headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let req = request_with_headers(&[("x-real-ip", "198.51.100.7")]);
        assert_eq!(client_ip(&req), "198.51.100.7");
    }

    #[test]
    fn test_client_ip_unknown_without_headers() {
        let req = request_with_headers(&[]);
        assert_eq!(client_ip(&req), "unknown");
    }
}
