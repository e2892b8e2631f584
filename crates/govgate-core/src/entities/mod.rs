// crates/govgate-core/src/entities/mod.rs
// ============================================================================
// Module: Governed Decision Engine Entities
// Description: Sum types and records for every entity named in the data model.
// Purpose: Group C1 (entity model) behind one module; no behavior lives here
// beyond small, obviously-true predicates on the data itself.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Each entity is an immutable-after-creation record (spec §3), with the two
//! narrow exceptions ([`crate::entities::situation::Situation`] attachment
//! append and status advance, [`crate::entities::episode::Episode`] state
//! advance, [`crate::entities::mandate::AutonomyMandate`] narrow mutators)
//! enforced by the repositories in `govgate-store`, not by these types
//! themselves.

pub mod consequence;
pub mod contract;
pub mod decision;
pub mod episode;
pub mod event_log;
pub mod identifiers;
pub mod mandate;
pub mod protocol;
pub mod situation;
pub mod time;
