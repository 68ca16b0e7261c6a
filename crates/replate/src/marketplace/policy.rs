use chrono::{DateTime, Utc};

use super::domain::{Claim, Listing, ListingStatus};

/// Single source of truth for a listing's surfaced status.
///
/// A claim, once created, permanently dominates expiration: a listing claimed
/// one second before its window closes stays `Claimed` forever after. Absent a
/// claim, the listing is `Expired` from the instant `now >= expires_at` and
/// `Available` before it. Deterministic in its inputs; every read surface must
/// call through here rather than trusting a stored status.
pub fn derive_status(listing: &Listing, claim: Option<&Claim>, now: DateTime<Utc>) -> ListingStatus {
    if let Some(claim) = claim {
        debug_assert_eq!(claim.listing_id, listing.id, "claim belongs to another listing");
        return ListingStatus::Claimed;
    }

    if now >= listing.expires_at {
        ListingStatus::Expired
    } else {
        ListingStatus::Available
    }
}
