//! # BoardError
//!
//! Centralized error taxonomy for CampusFound. Validation and auth-required
//! failures are detected locally before any remote call; upload, write and
//! not-found failures surface after a remote round-trip.

use thiserror::Error;

/// The primary error type for all board operations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Delegated sign-in flow failed or was cancelled by the user.
    #[error("sign-in failed: {0}")]
    Auth(String),

    /// A mutation was attempted without an active session.
    #[error("an authenticated session is required")]
    AuthRequired,

    /// Required create fields missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image upload failed; no post document was written.
    #[error("image upload failed: {0}")]
    Upload(String),

    /// Remote write failed (network/permission).
    #[error("remote write failed: {0}")]
    Write(String),

    /// Mutation target no longer exists.
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The sync channel to the post collection broke.
    #[error("subscription error: {0}")]
    Subscription(String),
}

/// A specialized Result type for CampusFound logic.
pub type Result<T> = std::result::Result<T, BoardError>;
