//! House CRUD, the listing filter builder, and the booking patches.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, to_document, Bson, Document, Regex};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::api::{parse_object_id, DeleteAck, InsertAck, UpdateAck};
use crate::db::{BookHouseUpdate, BookedFlagUpdate, House, HouseUpdate};
use crate::AppState;

/// Query parameters for `GET /api/allHouses`. Kept as raw strings so that
/// unparseable values produce a structured 400 instead of a deserializer
/// rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListHousesQuery {
    pub city: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    #[serde(rename = "roomSize")]
    pub room_size: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

/// Empty query parameters count as absent, matching what the frontend sends.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_i64(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation_field(field, format!("{field} must be an integer")))
}

fn parse_u64(field: &str, value: &str) -> Result<u64, ApiError> {
    value
        .parse()
        .map_err(|_| {
            ApiError::validation_field(field, format!("{field} must be a non-negative integer"))
        })
}

/// Pagination wins over filtering: when `limit` is supplied the listing
/// paginates the unfiltered collection and every filter parameter is ignored.
fn pagination(params: &ListHousesQuery) -> Result<Option<(u64, i64)>, ApiError> {
    let Some(limit) = present(&params.limit) else {
        return Ok(None);
    };
    let limit = parse_i64("limit", limit)?;
    let skip = match present(&params.skip) {
        Some(skip) => parse_u64("skip", skip)?,
        None => 0,
    };
    Ok(Some((skip, limit)))
}

/// Build the conjunctive listing filter.
///
/// City matches as a case-insensitive substring; bedrooms, bathrooms, and
/// room size match exactly; rent is an inclusive range applied only when both
/// bounds are supplied.
fn build_filter(params: &ListHousesQuery) -> Result<Document, ApiError> {
    let mut filter = Document::new();

    if let Some(city) = present(&params.city) {
        filter.insert(
            "city",
            Bson::RegularExpression(Regex {
                pattern: city.to_string(),
                options: "i".to_string(),
            }),
        );
    }

    if let Some(bedrooms) = present(&params.bedrooms) {
        filter.insert("bedrooms", parse_i64("bedrooms", bedrooms)?);
    }

    if let Some(bathrooms) = present(&params.bathrooms) {
        filter.insert("bathrooms", parse_i64("bathrooms", bathrooms)?);
    }

    if let Some(room_size) = present(&params.room_size) {
        filter.insert("room_size", parse_i64("roomSize", room_size)?);
    }

    if let (Some(min), Some(max)) = (present(&params.min_price), present(&params.max_price)) {
        filter.insert(
            "rent_per_month",
            doc! {
                "$gte": parse_i64("minPrice", min)?,
                "$lte": parse_i64("maxPrice", max)?,
            },
        );
    }

    Ok(filter)
}

/// Filtered or paginated house listing
///
/// GET /api/allHouses
///
/// When `limit` is supplied the route paginates over the unfiltered
/// collection and every filter parameter is ignored; pagination and filtering
/// are mutually exclusive.
pub async fn list_all_houses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListHousesQuery>,
) -> Result<Json<Vec<House>>, ApiError> {
    if let Some((skip, limit)) = pagination(&params)? {
        let houses: Vec<House> = state
            .db
            .houses
            .find(doc! {})
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        return Ok(Json(houses));
    }

    let filter = build_filter(&params)?;
    let houses: Vec<House> = state.db.houses.find(filter).await?.try_collect().await?;
    Ok(Json(houses))
}

/// Total number of houses
///
/// GET /api/houseCount
pub async fn house_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.db.houses.estimated_document_count().await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

/// Create a house listing
///
/// POST /houses
pub async fn create_house(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(house): Json<House>,
) -> Result<(StatusCode, Json<InsertAck>), ApiError> {
    let result = state.db.houses.insert_one(&house).await?;
    Ok((StatusCode::CREATED, Json(InsertAck::from(result))))
}

/// List all houses
///
/// GET /houses
pub async fn list_houses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<House>>, ApiError> {
    let houses: Vec<House> = state.db.houses.find(doc! {}).await?.try_collect().await?;
    Ok(Json(houses))
}

/// Get a house by id
///
/// GET /houses/:id
pub async fn get_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<House>, ApiError> {
    let id = parse_object_id(&id)?;
    let house = state
        .db
        .houses
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found("House not found"))?;
    Ok(Json(house))
}

/// Replace a house's fields
///
/// PATCH /houses/:id
///
/// Plain update, not an upsert: a missing id is a 404, never a silent insert.
pub async fn update_house(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<HouseUpdate>,
) -> Result<Json<UpdateAck>, ApiError> {
    let id = parse_object_id(&id)?;
    let fields =
        to_document(&update).map_err(|_| ApiError::internal("Failed to encode update"))?;

    let result = state
        .db
        .houses
        .update_one(doc! { "_id": id }, doc! { "$set": fields })
        .await?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("House not found"));
    }
    Ok(Json(UpdateAck::from(result)))
}

/// Mark a house booked and record the booking owner
///
/// PATCH /bookHouses/:id
///
/// Last write wins: two concurrent bookings of the same house both succeed.
pub async fn book_house(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<BookHouseUpdate>,
) -> Result<Json<UpdateAck>, ApiError> {
    let id = parse_object_id(&id)?;
    let result = state
        .db
        .houses
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "isBooked": update.is_booked, "userEmail": update.user_email } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("House not found"));
    }
    Ok(Json(UpdateAck::from(result)))
}

/// Set only the booking flag
///
/// PATCH /bookedHouses/:id
pub async fn set_booked_flag(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<BookedFlagUpdate>,
) -> Result<Json<UpdateAck>, ApiError> {
    let id = parse_object_id(&id)?;
    let result = state
        .db
        .houses
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "isBooked": update.is_booked } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("House not found"));
    }
    Ok(Json(UpdateAck::from(result)))
}

/// Delete a house
///
/// DELETE /houses/:id
///
/// Deleting an id that no longer exists reports `deletedCount: 0` without
/// erroring.
pub async fn delete_house(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = parse_object_id(&id)?;
    let result = state.db.houses.delete_one(doc! { "_id": id }).await?;
    Ok(Json(DeleteAck::from(result)))
}
