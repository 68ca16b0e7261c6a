use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for surplus listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Identifier wrapper for claim records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub String);

/// Identifier for a restaurant or farm account, owned by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Role attached to an authenticated actor by the session collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Restaurant,
    Farm,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Restaurant => "restaurant",
            Role::Farm => "farm",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller identity forwarded into every core call. The core trusts it as
/// already verified; it owns no session state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId(id.into()),
            role,
        }
    }
}

/// Derived lifecycle state of a listing. Never persisted as truth; always
/// recomputed from timestamps and the claim ledger (see `policy::derive_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    Claimed,
    Expired,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Claimed => "claimed",
            ListingStatus::Expired => "expired",
        }
    }
}

/// Persisted listing record. Status is intentionally absent: a stored status
/// would drift from the claim ledger and the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
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
}

/// Caller-supplied fields for a new listing, validated before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub item_name: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl ListingDraft {
    /// Validate the draft and mint the persisted record. `created_at` is the
    /// injected clock reading, never a global clock.
    pub fn into_listing(
        self,
        id: ListingId,
        owner_id: ActorId,
        now: DateTime<Utc>,
    ) -> Result<Listing, ValidationError> {
        if self.item_name.trim().is_empty() {
            return Err(ValidationError::MissingItemName);
        }
        if self.quantity.trim().is_empty() {
            return Err(ValidationError::MissingQuantity);
        }
        if self.expires_at <= now {
            return Err(ValidationError::ExpiryNotInFuture {
                expires_at: self.expires_at,
            });
        }

        Ok(Listing {
            id,
            owner_id,
            item_name: self.item_name,
            quantity: self.quantity,
            description: self.description,
            image_ref: self.image_ref,
            expires_at: self.expires_at,
            created_at: now,
        })
    }
}

/// Rejections for malformed listing drafts; always the caller's fault and
/// recoverable by correcting input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("item name must not be empty")]
    MissingItemName,
    #[error("quantity must not be empty")]
    MissingQuantity,
    #[error("expiry {expires_at} is not in the future")]
    ExpiryNotInFuture { expires_at: DateTime<Utc> },
}

/// Append-only claim record. At most one ever exists per listing; the ledger
/// enforces that, not this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub listing_id: ListingId,
    pub claimant_id: ActorId,
    pub claimed_at: DateTime<Utc>,
}
