//! Planner domain model.
//!
//! # Responsibility
//! - Define the entities that make up a user's planner data.
//! - Own the single persisted aggregate and its document repair rules.
//!
//! # Invariants
//! - Every entity carries a stable `EntryId` unique within the aggregate.
//! - The aggregate is always structurally complete after a load; missing
//!   fields are repaired to documented defaults, never left absent.

pub mod aggregate;
pub mod catalog;
pub mod entities;
