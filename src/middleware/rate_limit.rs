use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use socialfeed_core::AppError;

use crate::metrics::track_rate_limit_rejection;
use crate::state::AppState;

const UNKNOWN_CLIENT: &str = "unknown";

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let from_forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    from_forwarded.or_else(from_real_ip).map(str::to_string)
}

/// Key identifying the caller: the peer IP, or the proxy-reported client when
/// proxy headers are trusted.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(client) = forwarded_client(headers) {
            return client;
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.rate_limit_config.enabled {
        return Ok(next.run(req).await);
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(
        req.headers(),
        peer,
        state.rate_limit_config.trust_proxy_headers,
    );

    let (admitted, retry_after) = state.rate_limiter.allow(&key);
    if !admitted {
        track_rate_limit_rejection();
        tracing::warn!(client = %key, ?retry_after, "rate limit exceeded");
        return Err(AppError::rate_limited(retry_after));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51000".parse().unwrap())
    }

    #[test]
    fn test_peer_address_without_trust() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.1"));
        assert_eq!(client_key(&headers, peer(), false), "192.0.2.10");
    }

    #[test]
    fn test_forwarded_first_entry_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_key(&headers, peer(), true), "203.0.113.1");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_key(&headers, peer(), true), "198.51.100.4");
        assert_eq!(client_key(&HeaderMap::new(), peer(), true), "192.0.2.10");
    }

    #[test]
    fn test_unknown_without_peer() {
        assert_eq!(client_key(&HeaderMap::new(), None, false), "unknown");
    }
}
