//! Public user lookups. Responses always use the hash-free view.

use axum::{
    extract::{Path, State},
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::doc;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::parse_object_id;
use crate::db::{PublicUser, User};
use crate::AppState;

/// List all users
///
/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users: Vec<User> = state.db.users.find(doc! {}).await?.try_collect().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Get a user by id
///
/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_object_id(&id)?;
    let user = state
        .db
        .users
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}
