//! Surplus listing lifecycle and claim coordination.
//!
//! A restaurant posts a listing of surplus food; exactly one farm may claim it
//! before it expires. The claim ledger's atomic check-and-insert is what makes
//! the two-edge state machine (`Available -> Claimed`, `Available -> Expired`)
//! sound under concurrent claim attempts.

pub mod domain;
pub mod memory;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, ActorId, Claim, ClaimId, Listing, ListingDraft, ListingId, ListingStatus, Role,
    ValidationError,
};
pub use memory::InMemoryMarket;
pub use policy::derive_status;
pub use repository::{ClaimError, ClaimLedger, ListingStore, StoreError};
pub use router::marketplace_router;
pub use service::{LifecycleError, ListingLifecycleService};
pub use views::{ClaimView, ListingView};
