//! The denormalized `bookedHousesList` collection.
//!
//! Entries are schema-flexible copies of booking-relevant house data; no
//! referential integrity is maintained with the house they came from.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, to_document, Document};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::{parse_object_id, DeleteAck, InsertAck};
use crate::AppState;

/// Record a booking
///
/// POST /bookedHousesList
pub async fn create_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<InsertAck>), ApiError> {
    let document = to_document(&body)
        .map_err(|_| ApiError::bad_request("Booking body must be a JSON object"))?;

    let result = state.db.booked_houses.insert_one(document).await?;
    Ok((StatusCode::CREATED, Json(InsertAck::from(result))))
}

/// List all bookings
///
/// GET /bookedHousesList
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let bookings: Vec<Document> = state
        .db
        .booked_houses
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    Ok(Json(bookings))
}

/// Get a booking by id
///
/// GET /bookedHousesList/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_object_id(&id)?;
    let booking = state
        .db
        .booked_houses
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    Ok(Json(booking))
}

/// Remove a booking
///
/// DELETE /bookedHousesList/:id
pub async fn delete_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = parse_object_id(&id)?;
    let result = state
        .db
        .booked_houses
        .delete_one(doc! { "_id": id })
        .await?;
    Ok(Json(DeleteAck::from(result)))
}
