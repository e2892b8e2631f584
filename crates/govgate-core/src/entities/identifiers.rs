// crates/govgate-core/src/entities/identifiers.rs
// ============================================================================
// Module: Governed Decision Engine Identifiers
// Description: Opaque, serializable identifiers for every entity in the model.
// Purpose: Give each entity a strongly typed id with a stable wire form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque UTF-8 strings. No normalization or validation is
//! applied by these wrapper types; callers that need validated forms (for
//! example tenant ids, see `govgate-tenant`) layer that on top.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Defines an opaque, string-backed identifier newtype with the standard
/// constructor/accessor/`Display`/`From` surface used throughout this crate.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Tenant identifier. Validated separately by `govgate-tenant`; this
    /// crate only carries the opaque value.
    TenantId
);

string_id!(
    /// Situation identifier.
    SituationId
);

string_id!(
    /// Episode identifier.
    EpisodeId
);

string_id!(
    /// Decision protocol identifier.
    ProtocolId
);

string_id!(
    /// Decision identifier.
    DecisionId
);

string_id!(
    /// Contract identifier.
    ContractId
);

string_id!(
    /// Consequence observation identifier.
    ObservationId
);

string_id!(
    /// Autonomy mandate identifier.
    MandateId
);

string_id!(
    /// Agent identifier referenced by mandates and the multi-agent runner.
    AgentId
);

string_id!(
    /// Analysis attachment identifier appended to a situation.
    AttachmentId
);

string_id!(
    /// Event log entry identifier.
    EventId
);
