use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{Actor, Claim, ListingDraft, ListingId, ListingStatus, Role, ValidationError};
use super::policy::derive_status;
use super::repository::{ClaimError, ClaimLedger, ListingStore, StoreError};
use super::views::ListingView;

/// Service composing the listing store and claim ledger behind the lifecycle
/// invariants: a listing is claimed at most once, never after expiry, and its
/// status is re-derived on every read.
pub struct ListingLifecycleService<S, L> {
    store: Arc<S>,
    ledger: Arc<L>,
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("lst-{id:06}"))
}

impl<S, L> ListingLifecycleService<S, L>
where
    S: ListingStore + 'static,
    L: ClaimLedger + 'static,
{
    pub fn new(store: Arc<S>, ledger: Arc<L>) -> Self {
        Self { store, ledger }
    }

    /// Validate and persist a new listing on behalf of a restaurant.
    pub fn create_listing(
        &self,
        actor: &Actor,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> Result<ListingView, LifecycleError> {
        self.require_role(actor, Role::Restaurant)?;

        let listing = draft.into_listing(next_listing_id(), actor.id.clone(), now)?;
        let stored = self.store.insert(listing)?;

        info!(listing_id = %stored.id.0, owner_id = %stored.owner_id.0, "listing created");
        Ok(ListingView::annotate(stored, None, now))
    }

    /// Attempt to claim a listing for a farm. Failure kinds from the ledger
    /// pass through unchanged so callers can branch on them.
    pub fn claim_listing(
        &self,
        actor: &Actor,
        listing_id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<Claim, LifecycleError> {
        self.require_role(actor, Role::Farm)?;

        match self.ledger.try_claim(listing_id, &actor.id, now) {
            Ok(claim) => {
                info!(listing_id = %listing_id.0, claimant_id = %actor.id.0, "listing claimed");
                Ok(claim)
            }
            Err(err) => {
                debug!(listing_id = %listing_id.0, claimant_id = %actor.id.0, %err, "claim rejected");
                Err(err.into())
            }
        }
    }

    /// One listing annotated with its derived status.
    pub fn get_listing(
        &self,
        listing_id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<ListingView, LifecycleError> {
        let listing = self
            .store
            .fetch(listing_id)?
            .ok_or(LifecycleError::NotFound)?;
        let claim = self.ledger.claim_for_listing(&listing.id)?;
        Ok(ListingView::annotate(listing, claim, now))
    }

    /// Listings still open to claims at `now`, soonest-expiring first. The
    /// ordering is an urgency cue for the browsing farm, not incidental.
    pub fn available_listings(&self, now: DateTime<Utc>) -> Result<Vec<ListingView>, LifecycleError> {
        let mut views = Vec::new();
        for listing in self.store.all()? {
            let claim = self.ledger.claim_for_listing(&listing.id)?;
            if derive_status(&listing, claim.as_ref(), now) == ListingStatus::Available {
                views.push(ListingView::annotate(listing, None, now));
            }
        }
        views.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        Ok(views)
    }

    /// Role-scoped listing view: a restaurant sees its own listings regardless
    /// of status (newest first, claims included); a farm sees what it can claim.
    pub fn listings_for_actor(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListingView>, LifecycleError> {
        match actor.role {
            Role::Restaurant => {
                let mut views = Vec::new();
                for listing in self.store.by_owner(&actor.id)? {
                    let claim = self.ledger.claim_for_listing(&listing.id)?;
                    views.push(ListingView::annotate(listing, claim, now));
                }
                Ok(views)
            }
            Role::Farm => self.available_listings(now),
        }
    }

    /// Listings a farm has claimed itself, most recent claim first.
    pub fn claimed_by(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListingView>, LifecycleError> {
        self.require_role(actor, Role::Farm)?;

        let mut views = Vec::new();
        for claim in self.ledger.by_claimant(&actor.id)? {
            if let Some(listing) = self.store.fetch(&claim.listing_id)? {
                views.push(ListingView::annotate(listing, Some(claim), now));
            }
        }
        Ok(views)
    }

    fn require_role(&self, actor: &Actor, required: Role) -> Result<(), LifecycleError> {
        if actor.role == required {
            Ok(())
        } else {
            Err(LifecycleError::Unauthorized { required })
        }
    }
}

/// Error raised by the lifecycle service. Each variant stays distinct end to
/// end; nothing collapses into a generic failure and nothing retries here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{required} role required")]
    Unauthorized { required: Role },
    #[error("listing not found")]
    NotFound,
    #[error("listing already claimed")]
    AlreadyClaimed,
    #[error("listing expired before the claim")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ClaimError> for LifecycleError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::NotFound => LifecycleError::NotFound,
            ClaimError::AlreadyClaimed => LifecycleError::AlreadyClaimed,
            ClaimError::Expired => LifecycleError::Expired,
            ClaimError::Store(err) => LifecycleError::Store(err),
        }
    }
}
