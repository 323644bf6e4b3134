//! Token-guarded mutation surface.
//!
//! Handlers are thin: deserialize the payload, split off the optional
//! `updated_at` stamp, hand everything to [`AdminCatalog`]. The conflict gate
//! and cache invalidation live there.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use time::Date;
use uuid::Uuid;

use crate::application::admin::{
    CreateCircleCommand, UpdateArtistCommand, UpdateCircleCommand, UpdateReleaseCommand,
};
use crate::application::conflict::VersionStamp;

use super::error::ApiError;
use super::public::AppState;

pub fn build_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/api/artists/{id}", put(update_artist))
        .route("/admin/api/circles", post(create_circle))
        .route(
            "/admin/api/circles/{id}",
            put(update_circle).delete(delete_circle),
        )
        .route("/admin/api/releases/{id}", put(update_release))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}

async fn admin_auth(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return ApiError::unauthorized().into_response();
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_matches(token, expected) => next.run(request).await,
        _ => ApiError::unauthorized().into_response(),
    }
}

fn token_matches(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtistPayload {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub updated_at: Option<VersionStamp>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCirclePayload {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCirclePayload {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub updated_at: Option<VersionStamp>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReleasePayload {
    pub title: String,
    #[serde(default)]
    pub catalog_number: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub updated_at: Option<VersionStamp>,
}

async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArtistPayload>,
) -> Result<Response, ApiError> {
    let record = state
        .admin
        .update_artist(UpdateArtistCommand {
            id,
            expected_updated_at: payload.updated_at,
            name: payload.name,
            country: payload.country,
            notes: payload.notes,
        })
        .await?;
    Ok(Json(record).into_response())
}

async fn create_circle(
    State(state): State<AppState>,
    Json(payload): Json<CreateCirclePayload>,
) -> Result<Response, ApiError> {
    let record = state
        .admin
        .create_circle(CreateCircleCommand {
            name: payload.name,
            country: payload.country,
            website: payload.website,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn update_circle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCirclePayload>,
) -> Result<Response, ApiError> {
    let record = state
        .admin
        .update_circle(UpdateCircleCommand {
            id,
            expected_updated_at: payload.updated_at,
            name: payload.name,
            country: payload.country,
            website: payload.website,
        })
        .await?;
    Ok(Json(record).into_response())
}

async fn delete_circle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.admin.delete_circle(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn update_release(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReleasePayload>,
) -> Result<Response, ApiError> {
    let record = state
        .admin
        .update_release(UpdateReleaseCommand {
            id,
            expected_updated_at: payload.updated_at,
            title: payload.title,
            catalog_number: payload.catalog_number,
            event_name: payload.event_name,
            release_date: payload.release_date,
            category_id: payload.category_id,
        })
        .await?;
    Ok(Json(record).into_response())
}
