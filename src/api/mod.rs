pub mod auth;
mod bookings;
pub mod error;
mod houses;
mod users;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use mongodb::bson::oid::ObjectId;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::config::CorsConfig;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/", get(health_check))
        // Auth
        .route("/users", post(auth::register).get(users::list_users))
        .route("/users/:id", get(users::get_user))
        .route("/login", post(auth::login))
        .route("/logOut", post(auth::logout))
        .route("/logout", delete(auth::logout))
        .route("/loggedInUser", get(auth::logged_in_user))
        // Listing and count
        .route("/api/allHouses", get(houses::list_all_houses))
        .route("/api/houseCount", get(houses::house_count))
        // Houses
        .route("/houses", post(houses::create_house).get(houses::list_houses))
        .route(
            "/houses/:id",
            get(houses::get_house)
                .patch(houses::update_house)
                .delete(houses::delete_house),
        )
        .route("/bookHouses/:id", patch(houses::book_house))
        .route("/bookedHouses/:id", patch(houses::set_booked_flag))
        // Booked houses list
        .route(
            "/bookedHousesList",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route(
            "/bookedHousesList/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the allow-listed frontend origins.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Parse a path id into an ObjectId, rejecting malformed ids up front instead
/// of letting them reach the driver.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::validation_field("id", "Invalid document id"))
}

/// Fixed mutation acknowledgments; driver result structs are never echoed raw.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub inserted_id: Option<String>,
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        Self {
            inserted_id: result.inserted_id.as_object_id().map(|id| id.to_hex()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        Self {
            deleted_count: result.deleted_count,
        }
    }
}
