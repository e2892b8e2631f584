// crates/govgate-store/src/lib.rs
// ============================================================================
// Module: Governed Decision Engine Store Library
// Description: File-based implementations of the `govgate-core` repository
//              and event-log traits, plus backup manifest support.
// Purpose: Concrete C2/C3 storage backend for one tenant's data directory.
// Dependencies: govgate_core::interfaces, crate::{fs_util, repository,
//                event_log, backup}
// ============================================================================

//! ## Overview
//! This crate owns on-disk layout (spec §3 "Ownership"): one flat JSON file
//! per entity family plus the segmented, hash-chained event log, all rooted
//! at a directory handed in by the caller (typically a tenant's data
//! directory, see `govgate-tenant`). Nothing here knows about tenancy itself.

pub mod backup;
pub mod event_log;
pub mod fs_util;
pub mod repository;

pub use event_log::EventLogConfig;
pub use event_log::FileEventLogSink;
pub use govgate_core::StoreError;
pub use repository::FileConsequenceRepository;
pub use repository::FileContractRepository;
pub use repository::FileDecisionRepository;
pub use repository::FileEpisodeRepository;
pub use repository::FileMandateRepository;
pub use repository::FileProtocolRepository;
pub use repository::FileSituationRepository;
