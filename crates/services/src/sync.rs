//! Live mirror of the remote post collection.
//!
//! One task owns the subscription and is the only writer of the mirror;
//! every delivery replaces the whole mirror atomically. Consumers hold
//! `watch` receivers and never observe a partially merged state.

use std::sync::Arc;
use std::time::Duration;

use domains::{BoardStore, Post, PostDocument};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Where the mirror currently stands relative to the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// No delivery received yet.
    Loading,
    /// Posts are current as of the latest delivery.
    Live,
    /// The subscription broke; the mirror retains the last known posts
    /// while the retry loop works.
    Degraded { reason: String },
}

/// One consistent snapshot of the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub phase: SyncPhase,
    pub posts: Vec<Post>,
}

impl Mirror {
    fn loading() -> Self {
        Self {
            phase: SyncPhase::Loading,
            posts: Vec::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.phase == SyncPhase::Live
    }
}

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Maintains the live local mirror of the post collection.
///
/// On a broken subscription the mirror degrades and the task retries with
/// exponential backoff (1s doubling to 30s, reset after any successful
/// delivery) until shutdown.
pub struct PostSync {
    rx: watch::Receiver<Mirror>,
    task: JoinHandle<()>,
}

impl PostSync {
    /// Spawns the sync task and returns the service handle.
    pub fn start(store: Arc<dyn BoardStore>) -> Self {
        let (tx, rx) = watch::channel(Mirror::loading());
        let task = tokio::spawn(run(store, tx));
        Self { rx, task }
    }

    /// The live mirror. Receivers observe every whole-mirror replacement.
    pub fn mirror(&self) -> watch::Receiver<Mirror> {
        self.rx.clone()
    }

    /// The mirror as of now.
    pub fn snapshot(&self) -> Mirror {
        self.rx.borrow().clone()
    }

    /// Stops processing deliveries. Idempotent; no mirror update is
    /// published after teardown.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for PostSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(store: Arc<dyn BoardStore>, tx: watch::Sender<Mirror>) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match store.subscribe_posts().await {
            Ok(mut feed) => {
                while let Some(batch) = feed.recv().await {
                    backoff = INITIAL_BACKOFF;
                    let posts: Vec<Post> =
                        batch.into_iter().map(PostDocument::normalized).collect();
                    debug!(count = posts.len(), "mirror replaced");
                    tx.send_replace(Mirror {
                        phase: SyncPhase::Live,
                        posts,
                    });
                }
                degrade(&tx, "post feed closed");
            }
            Err(e) => degrade(&tx, &e.to_string()),
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

fn degrade(tx: &watch::Sender<Mirror>, reason: &str) {
    warn!(reason, "post subscription degraded; will retry");
    tx.send_modify(|mirror| {
        mirror.phase = SyncPhase::Degraded {
            reason: reason.to_string(),
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{
        BoardError, Category, MockBoardStore, PostId, PostKind, PostStatus,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    fn doc(id: &str, stamped: bool) -> PostDocument {
        PostDocument {
            id: PostId::from(id),
            kind: PostKind::Lost,
            title: "Blue Wallet".to_string(),
            description: String::new(),
            location: String::new(),
            category: Category::IdCardsWallets,
            date: "2026-08-01".to_string(),
            contact_email: "x@campus.edu".to_string(),
            contact_phone: None,
            image_url: None,
            created_by: "u-1".to_string(),
            creator_name: None,
            creator_photo: None,
            created_at: stamped.then(Utc::now),
            status: PostStatus::Open,
        }
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<Mirror>, pred: F) -> Mirror
    where
        F: Fn(&Mirror) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let current = rx.borrow_and_update().clone();
                if pred(&current) {
                    return current;
                }
                rx.changed().await.expect("sync task gone");
            }
        })
        .await
        .expect("mirror never reached the expected state")
    }

    #[tokio::test(start_paused = true)]
    async fn replaces_mirror_and_normalizes_pending_stamp() {
        let mut store = MockBoardStore::new();
        let (tx, rx) = mpsc::channel(8);
        store.expect_subscribe_posts().return_once(move || Ok(rx));

        let sync = PostSync::start(Arc::new(store));
        let mut mirror = sync.mirror();
        assert_eq!(mirror.borrow().phase, SyncPhase::Loading);

        tx.send(vec![doc("b", true), doc("a", false)]).await.unwrap();
        let m = wait_for(&mut mirror, Mirror::is_live).await;
        assert_eq!(m.posts.len(), 2);
        assert!(m.posts[0].created_at > 0);
        assert_eq!(m.posts[1].created_at, 0);

        // a later delivery replaces the whole mirror, not merges into it
        tx.send(vec![doc("b", true)]).await.unwrap();
        let m = wait_for(&mut mirror, |m| m.is_live() && m.posts.len() == 1).await;
        assert_eq!(m.posts[0].id, PostId::from("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn degrades_when_feed_closes_and_keeps_last_posts() {
        let mut store = MockBoardStore::new();
        let (tx, rx) = mpsc::channel(8);
        let mut feeds = VecDeque::from([rx]);
        store
            .expect_subscribe_posts()
            .returning(move || match feeds.pop_front() {
                Some(feed) => Ok(feed),
                None => Err(BoardError::Subscription("store offline".to_string())),
            });

        let sync = PostSync::start(Arc::new(store));
        let mut mirror = sync.mirror();

        tx.send(vec![doc("a", true)]).await.unwrap();
        wait_for(&mut mirror, Mirror::is_live).await;

        drop(tx);
        let m = wait_for(&mut mirror, |m| {
            matches!(m.phase, SyncPhase::Degraded { .. })
        })
        .await;
        assert_eq!(m.posts.len(), 1, "degraded mirror retains last posts");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_backoff_until_subscription_recovers() {
        let mut store = MockBoardStore::new();
        let (tx, rx) = mpsc::channel(8);
        let feeds = Mutex::new(VecDeque::from([rx]));
        let mut failures_left = 3;
        store.expect_subscribe_posts().returning(move || {
            if failures_left > 0 {
                failures_left -= 1;
                return Err(BoardError::Subscription("store offline".to_string()));
            }
            feeds
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BoardError::Subscription("store offline".to_string()))
        });

        let sync = PostSync::start(Arc::new(store));
        let mut mirror = sync.mirror();

        wait_for(&mut mirror, |m| {
            matches!(m.phase, SyncPhase::Degraded { .. })
        })
        .await;

        tx.send(vec![doc("a", true)]).await.unwrap();
        let m = wait_for(&mut mirror, Mirror::is_live).await;
        assert_eq!(m.posts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_idempotent_and_stops_updates() {
        let mut store = MockBoardStore::new();
        let (tx, rx) = mpsc::channel(8);
        store.expect_subscribe_posts().return_once(move || Ok(rx));

        let sync = PostSync::start(Arc::new(store));
        let mut mirror = sync.mirror();
        tx.send(vec![doc("a", true)]).await.unwrap();
        wait_for(&mut mirror, Mirror::is_live).await;

        sync.shutdown();
        sync.shutdown();
        tokio::task::yield_now().await;

        let before = mirror.borrow().clone();
        let _ = tx.send(vec![]).await;
        tokio::task::yield_now().await;
        assert_eq!(*mirror.borrow(), before, "no updates after teardown");
    }
}
