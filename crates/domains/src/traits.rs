//! # Core Traits (Ports)
//!
//! The external collaborators — document store, identity provider, image
//! host — behind swappable trait objects. Any adapter crate implements these
//! to be used by the services.

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use tokio::sync::{mpsc, watch};

use crate::error::Result;
use crate::models::{NewPostRecord, PostDocument, PostId, Principal, UserProfile};

/// Full-snapshot subscription feed. Every item is the *complete* current
/// result set for the post collection, ordered by creation time descending —
/// never a delta. A closed channel means the subscription broke.
pub type PostFeed = mpsc::Receiver<Vec<PostDocument>>;

/// Data persistence contract for posts and user profiles.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Establishes a continuous subscription to the post collection.
    /// Fails with `Subscription` when the channel cannot be opened.
    async fn subscribe_posts(&self) -> Result<PostFeed>;

    /// Writes a new post document. The store assigns the id and the
    /// creation timestamp. Fails with `Write`.
    async fn create_post(&self, record: NewPostRecord) -> Result<PostId>;

    /// Flips a post to resolved. Resolving an already-resolved post is a
    /// success; a missing id fails with `NotFound`.
    async fn resolve_post(&self, id: &PostId) -> Result<()>;

    /// Removes a post permanently. Deleting a missing id is a successful
    /// no-op.
    async fn delete_post(&self, id: &PostId) -> Result<()>;

    /// Merge-style upsert of a profile record, keyed by uid.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<()>;
}

/// Federated sign-in contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Runs the delegated consent flow. Fails with `Auth` on cancellation or
    /// provider error, leaving the session signed out.
    async fn sign_in(&self) -> Result<Principal>;

    /// Clears the session unconditionally; local state clears without
    /// waiting on remote invalidation.
    async fn sign_out(&self) -> Result<()>;

    /// Push-based view of the current principal (or absence).
    fn sessions(&self) -> watch::Receiver<Option<Principal>>;
}

/// Image hosting contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Uploads a binary image and returns its public URL. Fails with
    /// `Upload`.
    async fn upload(&self, data: Bytes, content_type: &Mime) -> Result<String>;
}
