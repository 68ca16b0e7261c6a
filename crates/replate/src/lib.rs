//! Replate core: matches perishable food surplus from restaurants to farms
//! through a claim workflow with expiration.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
