use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::domain::{Actor, ActorId, Claim, Listing, ListingDraft, ListingId, Role};
use crate::marketplace::memory::InMemoryMarket;
use crate::marketplace::repository::{ClaimError, ClaimLedger, ListingStore, StoreError};
use crate::marketplace::service::ListingLifecycleService;
use crate::marketplace::views::ListingView;

/// Fixed reference instant so tests never touch the wall clock.
pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

pub(super) fn restaurant() -> Actor {
    Actor::new("rest-bistro", Role::Restaurant)
}

pub(super) fn farm(suffix: &str) -> Actor {
    Actor::new(format!("farm-{suffix}"), Role::Farm)
}

pub(super) fn draft(item_name: &str) -> ListingDraft {
    ListingDraft {
        item_name: item_name.to_string(),
        quantity: "10 units".to_string(),
        description: Some("Day-old sourdough and trimmings".to_string()),
        image_ref: Some("images/surplus/bread.jpg".to_string()),
        expires_at: t0() + hours(2),
    }
}

pub(super) fn build_service() -> (
    ListingLifecycleService<InMemoryMarket, InMemoryMarket>,
    Arc<InMemoryMarket>,
) {
    let market = Arc::new(InMemoryMarket::default());
    let service = ListingLifecycleService::new(market.clone(), market.clone());
    (service, market)
}

pub(super) fn create_available(
    service: &ListingLifecycleService<InMemoryMarket, InMemoryMarket>,
    item_name: &str,
) -> ListingView {
    service
        .create_listing(&restaurant(), draft(item_name), t0())
        .expect("listing creation succeeds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Backend stub where every call fails as unavailable.
pub(super) struct UnavailableMarket;

impl ListingStore for UnavailableMarket {
    fn insert(&self, _listing: Listing) -> Result<Listing, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ListingId) -> Result<Option<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_owner(&self, _owner_id: &ActorId) -> Result<Vec<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Listing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl ClaimLedger for UnavailableMarket {
    fn try_claim(
        &self,
        _listing_id: &ListingId,
        _claimant_id: &ActorId,
        _now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError> {
        Err(ClaimError::Store(StoreError::Unavailable(
            "database offline".to_string(),
        )))
    }

    fn claim_for_listing(&self, _listing_id: &ListingId) -> Result<Option<Claim>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_claimant(&self, _claimant_id: &ActorId) -> Result<Vec<Claim>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Ledger stub whose claim path exceeds its deadline.
pub(super) struct TimeoutLedger;

impl ClaimLedger for TimeoutLedger {
    fn try_claim(
        &self,
        _listing_id: &ListingId,
        _claimant_id: &ActorId,
        _now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError> {
        Err(ClaimError::Store(StoreError::Timeout(250)))
    }

    fn claim_for_listing(&self, _listing_id: &ListingId) -> Result<Option<Claim>, StoreError> {
        Err(StoreError::Timeout(250))
    }

    fn by_claimant(&self, _claimant_id: &ActorId) -> Result<Vec<Claim>, StoreError> {
        Err(StoreError::Timeout(250))
    }
}
