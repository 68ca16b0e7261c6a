use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{ActorId, Claim, ClaimId, Listing, ListingId};
use super::repository::{ClaimError, ClaimLedger, ListingStore, StoreError};

/// In-memory backing store implementing both the listing store and the claim
/// ledger over one shared table set.
///
/// Both tables live behind a single mutex, so `try_claim` observes the listing
/// row, the claim row, and the clock reading under one critical section. That
/// lock is the serialization point standing in for a database uniqueness
/// constraint on `listing_id`.
#[derive(Default, Clone)]
pub struct InMemoryMarket {
    state: Arc<Mutex<MarketState>>,
}

#[derive(Default)]
struct MarketState {
    listings: HashMap<ListingId, Listing>,
    claims: HashMap<ListingId, Claim>,
}

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_id() -> ClaimId {
    let id = CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClaimId(format!("clm-{id:06}"))
}

impl InMemoryMarket {
    fn lock(&self) -> std::sync::MutexGuard<'_, MarketState> {
        self.state.lock().expect("market mutex poisoned")
    }
}

impl ListingStore for InMemoryMarket {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        let mut state = self.lock();
        state.listings.insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(self.lock().listings.get(id).cloned())
    }

    fn by_owner(&self, owner_id: &ActorId) -> Result<Vec<Listing>, StoreError> {
        let state = self.lock();
        let mut listings: Vec<Listing> = state
            .listings
            .values()
            .filter(|listing| &listing.owner_id == owner_id)
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    fn all(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.lock().listings.values().cloned().collect())
    }
}

impl ClaimLedger for InMemoryMarket {
    fn try_claim(
        &self,
        listing_id: &ListingId,
        claimant_id: &ActorId,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError> {
        let mut state = self.lock();

        let expires_at = match state.listings.get(listing_id) {
            Some(listing) => listing.expires_at,
            None => return Err(ClaimError::NotFound),
        };

        // An existing claim wins over expiry, matching `derive_status`.
        if state.claims.contains_key(listing_id) {
            return Err(ClaimError::AlreadyClaimed);
        }
        if now >= expires_at {
            return Err(ClaimError::Expired);
        }

        let claim = Claim {
            id: next_claim_id(),
            listing_id: listing_id.clone(),
            claimant_id: claimant_id.clone(),
            claimed_at: now,
        };
        state.claims.insert(listing_id.clone(), claim.clone());
        Ok(claim)
    }

    fn claim_for_listing(&self, listing_id: &ListingId) -> Result<Option<Claim>, StoreError> {
        Ok(self.lock().claims.get(listing_id).cloned())
    }

    fn by_claimant(&self, claimant_id: &ActorId) -> Result<Vec<Claim>, StoreError> {
        let state = self.lock();
        let mut claims: Vec<Claim> = state
            .claims
            .values()
            .filter(|claim| &claim.claimant_id == claimant_id)
            .cloned()
            .collect();
        claims.sort_by(|a, b| b.claimed_at.cmp(&a.claimed_at));
        Ok(claims)
    }
}
