//! Booking endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use booking::Confirmation;
use booking_store::BookingStore;
use chrono::NaiveDate;
use common::BookingId;
use domain::{Booking, BookingChangeRequest, BookingRequest};
use serde::Serialize;

use super::Correlated;
use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: i64,
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_id: i64,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub total_cents: i64,
    pub status: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.as_i64(),
            user_id: booking.user_id.as_i64(),
            hotel_id: booking.hotel_id.as_i64(),
            room_id: booking.room_id.as_i64(),
            room_type: booking.room_type.to_string(),
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
            nights: booking.stay.nights(),
            total_cents: booking.total_amount.cents(),
            status: booking.status.to_string(),
        }
    }
}

/// POST /bookings — book a room, or join the waiting list if none is free.
#[tracing::instrument(skip(state, ctx, req))]
pub async fn create<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Confirmation>), ApiError> {
    let confirmation = state.orchestrator.create(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// GET /bookings/{id} — load a booking.
#[tracing::instrument(skip(state, ctx))]
pub async fn get<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .orchestrator
        .get_booking(&ctx, BookingId::new(id))
        .await?;
    Ok(Json(booking.into()))
}

/// PUT /bookings/{id} — change the room or dates of a booking.
#[tracing::instrument(skip(state, ctx, req))]
pub async fn update<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
    Json(req): Json<BookingChangeRequest>,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state
        .orchestrator
        .update(&ctx, BookingId::new(id), req)
        .await?;
    Ok(Json(confirmation))
}

/// POST /bookings/{id}/cancel — cancel a booking and release its room.
#[tracing::instrument(skip(state, ctx))]
pub async fn cancel<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state.orchestrator.cancel(&ctx, BookingId::new(id)).await?;
    Ok(Json(confirmation))
}
