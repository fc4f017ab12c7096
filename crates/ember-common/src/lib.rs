//! # Ember Common
//!
//! Common types and shared abstractions for Project Ember.
//!
//! This crate provides foundational types used across all Ember crates:
//! - ID types (EntityId, ItemId, AbilityId, MonsterId)
//! - World positions and ground-plane distance helpers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod position;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::position::*;
}

pub use prelude::*;
