//! Waiting-list endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use booking::Confirmation;
use booking_store::BookingStore;
use chrono::NaiveDate;
use common::WaitlistId;
use domain::{WaitingListEntry, WaitlistChangeRequest, WaitlistRequest};
use serde::Serialize;

use super::Correlated;
use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub hotel_id: i64,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
}

impl From<WaitingListEntry> for WaitlistResponse {
    fn from(entry: WaitingListEntry) -> Self {
        Self {
            id: entry.id.as_i64(),
            user_id: entry.user_id.as_i64(),
            user_email: entry.user_email,
            hotel_id: entry.hotel_id.as_i64(),
            room_type: entry.room_type.to_string(),
            check_in: entry.stay.check_in(),
            check_out: entry.stay.check_out(),
            status: entry.status.to_string(),
        }
    }
}

/// POST /waitlist — add a user to the waiting list.
#[tracing::instrument(skip(state, ctx, req))]
pub async fn create<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Json(req): Json<WaitlistRequest>,
) -> Result<(StatusCode, Json<Confirmation>), ApiError> {
    let confirmation = state.orchestrator.create_waitlist(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// GET /waitlist/{id} — load a waiting-list entry.
#[tracing::instrument(skip(state, ctx))]
pub async fn get<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
) -> Result<Json<WaitlistResponse>, ApiError> {
    let entry = state
        .orchestrator
        .get_waitlist(&ctx, WaitlistId::new(id))
        .await?;
    Ok(Json(entry.into()))
}

/// PUT /waitlist/{id} — change the hotel, room type or dates of an entry.
#[tracing::instrument(skip(state, ctx, req))]
pub async fn update<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
    Json(req): Json<WaitlistChangeRequest>,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state
        .orchestrator
        .update_waitlist(&ctx, WaitlistId::new(id), req)
        .await?;
    Ok(Json(confirmation))
}

/// DELETE /waitlist/{id} — remove a user from the waiting list.
#[tracing::instrument(skip(state, ctx))]
pub async fn delete<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Correlated(ctx): Correlated,
    Path(id): Path<i64>,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state
        .orchestrator
        .delete_waitlist(&ctx, WaitlistId::new(id))
        .await?;
    Ok(Json(confirmation))
}
