use chrono::{DateTime, Utc};

use super::domain::{ActorId, Claim, Listing, ListingId};

/// Storage abstraction over listing records so the service module can be
/// exercised against in-memory and real backends alike.
pub trait ListingStore: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError>;
    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;
    /// Listings for one owner, newest first.
    fn by_owner(&self, owner_id: &ActorId) -> Result<Vec<Listing>, StoreError>;
    fn all(&self) -> Result<Vec<Listing>, StoreError>;
}

/// Append-only claim storage. `try_claim` is the single concurrency-critical
/// operation in the system.
pub trait ClaimLedger: Send + Sync {
    /// Linearizable check-and-insert: verifies the listing exists, has no
    /// claim, and has not expired at `now`, then records the claim, all as
    /// one atomic unit. Two simultaneous calls for the same listing never
    /// both succeed; the loser gets `AlreadyClaimed`.
    fn try_claim(
        &self,
        listing_id: &ListingId,
        claimant_id: &ActorId,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimError>;

    fn claim_for_listing(&self, listing_id: &ListingId) -> Result<Option<Claim>, StoreError>;

    /// Claims made by one farm, newest first. Backs the "claimed" view.
    fn by_claimant(&self, claimant_id: &ActorId) -> Result<Vec<Claim>, StoreError>;
}

/// Failures of the backing store itself. `Timeout` is kept distinct from
/// `Unavailable` so callers can decide whether a blind retry is safe; the
/// ledger's uniqueness guarantee is what makes retrying `try_claim` harmless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("backing store call exceeded {0}ms deadline")]
    Timeout(u64),
}

/// Outcomes of a failed claim attempt, each semantically distinct so the
/// caller can tell "someone beat you to it" from "this listing is gone".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("listing not found")]
    NotFound,
    #[error("listing already claimed")]
    AlreadyClaimed,
    #[error("listing expired before the claim")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}
