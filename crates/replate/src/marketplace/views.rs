use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ActorId, Claim, ClaimId, Listing, ListingId};
use super::policy::derive_status;

/// Read-side projection of a listing with its derived status and, where the
/// caller is entitled to it, the claim that resolved it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub owner_id: ActorId,
    pub item_name: String,
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimView>,
}

impl ListingView {
    /// Annotate a listing with its status derived at `now`. The status is
    /// computed here and nowhere cached; callers re-annotate on every read.
    pub fn annotate(listing: Listing, claim: Option<Claim>, now: DateTime<Utc>) -> Self {
        let status = derive_status(&listing, claim.as_ref(), now).label();
        Self {
            id: listing.id,
            owner_id: listing.owner_id,
            item_name: listing.item_name,
            quantity: listing.quantity,
            description: listing.description,
            image_ref: listing.image_ref,
            expires_at: listing.expires_at,
            created_at: listing.created_at,
            status,
            claim: claim.map(ClaimView::from),
        }
    }
}

/// Sanitized claim projection embedded in owner-facing listing views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimView {
    pub id: ClaimId,
    pub claimant_id: ActorId,
    pub claimed_at: DateTime<Utc>,
}

impl From<Claim> for ClaimView {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id,
            claimant_id: claim.claimant_id,
            claimed_at: claim.claimed_at,
        }
    }
}
