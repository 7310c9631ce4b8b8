//! HTTP route handlers.

pub mod bookings;
pub mod system;
pub mod waitlist;

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use booking::RequestContext;
use common::CorrelationId;

/// Header carrying the caller's correlation ID.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Request context built from the `x-correlation-id` header.
///
/// A missing or malformed header yields a fresh correlation ID.
#[derive(Debug, Clone, Copy)]
pub struct Correlated(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Correlated {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| uuid::Uuid::parse_str(value.trim()).ok())
            .map(CorrelationId::from_uuid)
            .unwrap_or_default();

        Ok(Correlated(RequestContext::with_correlation_id(correlation_id)))
    }
}
