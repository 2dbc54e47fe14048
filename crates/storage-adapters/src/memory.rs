//! In-process board store for development profiles and tests.
//!
//! Documents live in a `DashMap`; every write pushes a fresh full snapshot
//! to all active subscriptions, which gives the same whole-collection-
//! replace semantics as the hosted backend. Timestamps are assigned from a
//! strictly increasing epoch-ms counter so insertion order survives writes
//! landing in the same millisecond.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    BoardError, BoardStore, NewPostRecord, PostDocument, PostFeed, PostId, PostStatus, Result,
    UserProfile,
};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

const FEED_CAPACITY: usize = 32;

pub struct MemoryBoardStore {
    posts: DashMap<PostId, PostDocument>,
    profiles: DashMap<String, UserProfile>,
    subscribers: DashMap<usize, mpsc::Sender<Vec<PostDocument>>>,
    next_subscriber: AtomicUsize,
    /// Strictly increasing epoch-ms clock standing in for the server stamp.
    clock: AtomicI64,
    /// When set, new subscriptions fail. Used by recovery tests.
    offline: AtomicBool,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self {
            posts: DashMap::new(),
            profiles: DashMap::new(),
            subscribers: DashMap::new(),
            next_subscriber: AtomicUsize::new(0),
            clock: AtomicI64::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Makes future `subscribe_posts` calls fail until cleared.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Closes every active feed, as a dropped network connection would.
    pub fn disconnect_feeds(&self) {
        self.subscribers.clear();
    }

    /// The stored profile for `uid`, if any.
    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.get(uid).map(|entry| entry.value().clone())
    }

    fn stamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(last.max(now - 1) + 1)
            })
            .unwrap_or(now);
        let assigned = prev.max(now - 1) + 1;
        DateTime::from_timestamp_millis(assigned).unwrap_or_else(Utc::now)
    }

    /// The complete current result set, creation time descending.
    fn snapshot(&self) -> Vec<PostDocument> {
        let mut all: Vec<PostDocument> = self
            .posts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        all
    }

    fn broadcast(&self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|_, tx| match tx.try_send(snapshot.clone()) {
                Ok(()) => true,
                // a slow reader keeps its slot and catches up on the next write
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
    }
}

impl Default for MemoryBoardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn subscribe_posts(&self) -> Result<PostFeed> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BoardError::Subscription("store offline".to_string()));
        }
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        // initial load: the complete current result set
        let _ = tx.send(self.snapshot()).await;
        let key = self.next_subscriber.fetch_add(1, Ordering::SeqCst);
        self.subscribers.insert(key, tx);
        debug!(subscriber = key, "post feed opened");
        Ok(rx)
    }

    async fn create_post(&self, record: NewPostRecord) -> Result<PostId> {
        let id = PostId(Uuid::now_v7().to_string());
        let doc = PostDocument {
            id: id.clone(),
            kind: record.kind,
            title: record.title,
            description: record.description,
            location: record.location,
            category: record.category,
            date: record.date,
            contact_email: record.contact_email,
            contact_phone: record.contact_phone,
            image_url: record.image_url,
            created_by: record.created_by,
            creator_name: record.creator_name,
            creator_photo: record.creator_photo,
            created_at: Some(self.stamp()),
            status: record.status,
        };
        self.posts.insert(id.clone(), doc);
        self.broadcast();
        Ok(id)
    }

    async fn resolve_post(&self, id: &PostId) -> Result<()> {
        match self.posts.get_mut(id) {
            Some(mut doc) => {
                doc.status = PostStatus::Resolved;
                drop(doc);
                self.broadcast();
                Ok(())
            }
            None => Err(BoardError::NotFound("post".to_string(), id.to_string())),
        }
    }

    async fn delete_post(&self, id: &PostId) -> Result<()> {
        if self.posts.remove(id).is_some() {
            self.broadcast();
        }
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        match self.profiles.entry(profile.uid.clone()) {
            Entry::Occupied(mut occupied) => {
                // merge semantics: fields the caller left empty keep their
                // stored value
                let existing_role = occupied.get().role;
                let mut merged = profile.clone();
                merged.role = merged.role.or(existing_role);
                occupied.insert(merged);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(profile.clone());
            }
        }
        Ok(())
    }
}
