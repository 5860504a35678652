//! Definitions for error types used throughout the draw engine.
//!
//! The engine fails fast: one structured error, never a partial draw.
//! Validation errors are 400-class; a failed post-construction self-check
//! is 500-class because it means the engine broke its own contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DrawError {
    /// Empty field, duplicate athlete id, or blank athlete id.
    #[error("invalid participants: {0}")]
    InvalidParticipants(String),

    /// Manual seeding with a duplicate or out-of-range seed.
    #[error("invalid seeding: {0}")]
    InvalidSeeding(String),

    /// Rules that cannot apply to this bracket (e.g. more manual seed
    /// ranks than half the bracket holds).
    #[error("invalid rules: {0}")]
    InvalidRules(String),

    /// The constructed draw failed its own invariant check.
    #[error("internal invariant violation: {0}")]
    InternalInvariant(String),
}

pub type DrawResult<T> = Result<T, DrawError>;

impl DrawError {
    /// Stable wire code for the `{ code, detail }` error body.
    pub fn code(&self) -> &'static str {
        match self {
            DrawError::InvalidParticipants(_) => "invalid_participants",
            DrawError::InvalidSeeding(_) => "invalid_seeding",
            DrawError::InvalidRules(_) => "invalid_rules",
            DrawError::InternalInvariant(_) => "internal_invariant_violation",
        }
    }

    /// HTTP status class the host should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            DrawError::InternalInvariant(_) => 500,
            _ => 400,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, DrawError::InternalInvariant(_))
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody { code: self.code().to_string(), detail: self.to_string() }
    }
}

/// The JSON error response: `{ "code": ..., "detail": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub detail: String,
}
