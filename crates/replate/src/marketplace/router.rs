use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Actor, ListingDraft, ListingId, Role};
use super::repository::{ClaimLedger, ListingStore, StoreError};
use super::service::{LifecycleError, ListingLifecycleService};
use super::views::ClaimView;

/// Router builder exposing the marketplace lifecycle over HTTP.
///
/// The actor identity and role ride along in each request, pre-verified by the
/// auth collaborator in front of this service. An optional `now` override keeps
/// the handlers usable with synthetic clocks; absent, the wall clock applies.
pub fn marketplace_router<S, L>(service: Arc<ListingLifecycleService<S, L>>) -> Router
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    Router::new()
        .route("/api/v1/listings", post(create_listing_handler::<S, L>))
        .route(
            "/api/v1/listings/available",
            get(available_listings_handler::<S, L>),
        )
        .route("/api/v1/listings/:listing_id", get(get_listing_handler::<S, L>))
        .route(
            "/api/v1/listings/:listing_id/claims",
            post(claim_listing_handler::<S, L>),
        )
        .route(
            "/api/v1/actors/:actor_id/listings",
            get(actor_listings_handler::<S, L>),
        )
        .route(
            "/api/v1/actors/:actor_id/claims",
            get(claimed_listings_handler::<S, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub actor_id: String,
    pub role: Role,
    pub item_name: String,
    pub quantity: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimListingRequest {
    pub actor_id: String,
    pub role: Role,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ActorReadParams {
    pub role: Role,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

pub(crate) async fn create_listing_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    axum::Json(request): axum::Json<CreateListingRequest>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    let actor = Actor::new(request.actor_id, request.role);
    let draft = ListingDraft {
        item_name: request.item_name,
        quantity: request.quantity,
        description: request.description,
        image_ref: request.image_ref,
        expires_at: request.expires_at,
    };

    match service.create_listing(&actor, draft, now) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn claim_listing_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    Path(listing_id): Path<String>,
    axum::Json(request): axum::Json<ClaimListingRequest>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    let actor = Actor::new(request.actor_id, request.role);
    let listing_id = ListingId(listing_id);

    match service.claim_listing(&actor, &listing_id, now) {
        Ok(claim) => (StatusCode::CREATED, axum::Json(ClaimView::from(claim))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_listing_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    Path(listing_id): Path<String>,
    Query(params): Query<ReadParams>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = params.now.unwrap_or_else(Utc::now);
    match service.get_listing(&ListingId(listing_id), now) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn available_listings_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    Query(params): Query<ReadParams>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = params.now.unwrap_or_else(Utc::now);
    match service.available_listings(now) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn actor_listings_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    Path(actor_id): Path<String>,
    Query(params): Query<ActorReadParams>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = params.now.unwrap_or_else(Utc::now);
    let actor = Actor::new(actor_id, params.role);
    match service.listings_for_actor(&actor, now) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn claimed_listings_handler<S, L>(
    State(service): State<Arc<ListingLifecycleService<S, L>>>,
    Path(actor_id): Path<String>,
    Query(params): Query<ActorReadParams>,
) -> Response
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    let now = params.now.unwrap_or_else(Utc::now);
    let actor = Actor::new(actor_id, params.role);
    match service.claimed_by(&actor, now) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Map each lifecycle failure to a distinct status so API clients can branch
/// without parsing messages.
fn error_response(err: LifecycleError) -> Response {
    let (status, kind) = match &err {
        LifecycleError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        LifecycleError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
        LifecycleError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        LifecycleError::AlreadyClaimed => (StatusCode::CONFLICT, "already_claimed"),
        LifecycleError::Expired => (StatusCode::GONE, "expired"),
        LifecycleError::Store(StoreError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        LifecycleError::Store(StoreError::Unavailable(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "unavailable")
        }
    };

    let payload = json!({
        "kind": kind,
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
