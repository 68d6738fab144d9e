//! Client identity extraction.
//!
//! The first `X-Forwarded-For` value wins (the originating client as reported by
//! the nearest proxy); otherwise the socket peer address is used.

use axum::{extract::ConnectInfo, http::Request};
use std::net::SocketAddr;

/// Header consulted before the connection address
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used for allow-list and rate-limit decisions.
///
/// `None` when neither source is available; such requests match nothing.
pub fn client_identity<B>(req: &Request<B>) -> Option<String> {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(first) = forwarded {
        return Some(first.to_string());
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
