//! Registration, login, and the cookie-backed session token.
//!
//! Sessions are stateless: a signed JWT carrying the user's email lives in an
//! http-only cookie named `token`. Logout only clears the cookie; an already
//! captured token stays valid until its expiry.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ValidationErrorBuilder};
use crate::db::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse, User};
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// bcrypt cost factor for stored password hashes.
const HASH_COST: u32 = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Issue a signed session token for `email`, valid for `ttl_hours`
pub fn issue_token(
    email: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        email: email.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a session token's signature and expiry, yielding its claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Build the session cookie carrying `token`.
///
/// No cookie max-age is set; the embedded expiry bounds the session.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

/// Identity of the caller, decoded from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let claims = verify_token(cookie.value(), &state.config.auth.token_secret)
            .map_err(|_| ApiError::unauthorized("Invalid or expired session"))?;

        Ok(AuthUser {
            email: claims.email,
        })
    }
}

/// Register a new user
///
/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), ApiError> {
    let mut validation = ValidationErrorBuilder::new();
    validation.require("fullName", &request.full_name);
    validation.require("role", &request.role);
    validation.require("phoneNumber", &request.phone_number);
    validation.require("email", &request.email);
    validation.require("password", &request.password);
    validation.finish()?;

    // At most one user per email
    let existing = state
        .db
        .users
        .find_one(doc! { "email": &request.email })
        .await?;
    if existing.is_some() {
        // The frontend expects a plain 400 for a duplicate email
        return Err(
            ApiError::conflict("Email already exists").with_status(StatusCode::BAD_REQUEST)
        );
    }

    let hashed = hash_password(&request.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let mut user = User {
        id: None,
        full_name: request.full_name,
        role: request.role,
        phone_number: request.phone_number,
        email: request.email,
        password: hashed,
    };

    let result = state.db.users.insert_one(&user).await?;
    user.id = result.inserted_id.as_object_id();

    tracing::info!("Registered user {}", user.email);

    let token = issue_token(
        &user.email,
        &state.config.auth.token_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|_| ApiError::internal("Failed to issue session token"))?;

    let jar = jar.add(session_cookie(token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            token,
            user_data: PublicUser::from(user),
        }),
    ))
}

/// Log in with email and password
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let mut validation = ValidationErrorBuilder::new();
    validation.require("email", &request.email);
    validation.require("password", &request.password);
    validation.finish()?;

    // The same message for both failure modes, never revealing which check
    // tripped
    let user = state
        .db
        .users
        .find_one(doc! { "email": &request.email })
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&request.password, &user.password) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(
        &user.email,
        &state.config.auth.token_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|_| ApiError::internal("Failed to issue session token"))?;

    tracing::info!("User {} logged in", user.email);

    let jar = jar.add(session_cookie(token));

    Ok((
        jar,
        Json(LoginResponse {
            user_data: PublicUser::from(user),
            success: true,
        }),
    ))
}

/// Clear the session cookie. The token itself stays valid until expiry.
///
/// POST /logOut, DELETE /logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(expired_session_cookie());
    (jar, Json(serde_json::json!({ "success": true })))
}

/// Current user's document, looked up from the verified session
///
/// GET /loggedInUser
pub async fn logged_in_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublicUser>, ApiError> {
    let found = state
        .db
        .users
        .find_one(doc! { "email": &user.email })
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(PublicUser::from(found)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Db;
    use axum::http::{header, Request};

    // Client construction is lazy, so no server is needed to build the
    // collection handles.
    async fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.token_secret = "test-secret".to_string();

        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let database = client.database("HouseHunterTest");
        let db = Db {
            users: database.collection("users"),
            houses: database.collection("houses"),
            booked_houses: database.collection("bookedHousesList"),
        };
        Arc::new(AppState::new(config, db))
    }

    #[test]
    fn extractor_rejects_missing_cookie() {
        tokio_test::block_on(async {
            let state = test_state().await;
            let (mut parts, _) = Request::builder()
                .uri("/loggedInUser")
                .body(())
                .unwrap()
                .into_parts();

            let err = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        });
    }

    #[test]
    fn extractor_rejects_tampered_cookie() {
        tokio_test::block_on(async {
            let state = test_state().await;
            let token = issue_token("user@example.com", "another-secret", 24).unwrap();
            let (mut parts, _) = Request::builder()
                .uri("/loggedInUser")
                .header(header::COOKIE, format!("token={token}"))
                .body(())
                .unwrap()
                .into_parts();

            let err = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        });
    }

    #[test]
    fn extractor_yields_identity_from_valid_cookie() {
        tokio_test::block_on(async {
            let state = test_state().await;
            let token = issue_token("user@example.com", "test-secret", 24).unwrap();
            let (mut parts, _) = Request::builder()
                .uri("/loggedInUser")
                .header(header::COOKIE, format!("token={token}"))
                .body(())
                .unwrap()
                .into_parts();

            let user = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
            assert_eq!(user.email, "user@example.com");
        });
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn verify_password_handles_garbage_hash() {
        assert!(!verify_password("anything", "not a bcrypt hash"));
    }

    #[test]
    fn token_round_trips_email() {
        let token = issue_token("user@example.com", "secret", 24).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_fails_verification() {
        let token = issue_token("user@example.com", "secret", 24).unwrap();

        // wrong secret
        assert!(verify_token(&token, "other-secret").is_err());

        // flipped payload byte
        let mut tampered = token.into_bytes();
        let mid = tampered.len() / 2;
        tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(verify_token(&tampered, "secret").is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        let token = issue_token("user@example.com", "secret", -1).unwrap();
        let mut validation = Validation::default();
        validation.leeway = 0;
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &validation,
        );
        assert!(result.is_err());
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert!(cookie.max_age().is_none());
    }
}
