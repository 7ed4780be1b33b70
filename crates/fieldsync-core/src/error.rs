// ── Core error types ──
//
// Expected conditions (an entity missing on lookup) are modelled as
// `Option`, never as errors. What remains here is either a deployment
// condition the caller handles locally (`Unsupported`) or a failure that
// propagates out of the dispatcher unchanged.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Entity already exists: {entity_type} {identifier}")]
    Conflict {
        entity_type: String,
        identifier: String,
    },

    #[error("No pending subscription with message id {mid}")]
    SubscriptionNotFound { mid: u16 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn conflict(entity_type: &str, identifier: impl ToString) -> Self {
        Self::Conflict {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    /// The failing capability is not configured in this deployment.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
