//! API key checks for the development lookup server

use axum::{
    body::Body,
    http::{Request, header},
};
use subtle::ConstantTimeEq;

/// Header the methods-lookup client sends its key in
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the API key from `x-api-key`, else `Authorization: Bearer <key>`
pub fn extract_api_key(request: &Request<Body>) -> Option<String> {
    if let Some(key) = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(key.to_string());
    }

    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Constant-time string comparison
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
