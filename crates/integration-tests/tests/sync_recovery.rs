//! A broken subscription degrades the mirror (keeping the last known
//! posts) and the sync service reconnects on its own once the store is
//! reachable again.

use std::sync::Arc;
use std::time::Duration;

use auth_adapters::DevIdentityProvider;
use domains::{Category, NewPost, PostKind, Principal};
use services::{BoardClient, Mirror, SyncPhase};
use storage_adapters::{MemoryBoardStore, MemoryMediaHost};
use tokio::sync::watch;

fn new_post(title: &str) -> NewPost {
    NewPost {
        kind: PostKind::Lost,
        title: title.to_string(),
        description: "gone missing".to_string(),
        location: "Quad".to_string(),
        category: Category::Others,
        date: "2026-08-05".to_string(),
        contact_email: "poster@campus.edu".to_string(),
        contact_phone: None,
        image: None,
    }
}

async fn wait_for<F>(rx: &mut watch::Receiver<Mirror>, pred: F) -> Mirror
where
    F: Fn(&Mirror) -> bool,
{
    tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            let current = rx.borrow_and_update().clone();
            if pred(&current) {
                return current;
            }
            rx.changed().await.expect("sync service gone");
        }
    })
    .await
    .expect("mirror never reached the expected state")
}

#[tokio::test]
async fn degrades_with_last_known_posts_then_recovers() -> anyhow::Result<()> {
    let store = Arc::new(MemoryBoardStore::new());
    let client = BoardClient::new(
        store.clone(),
        Arc::new(MemoryMediaHost::new()),
        Arc::new(DevIdentityProvider::new(Principal {
            uid: "u-1".to_string(),
            display_name: None,
            email: None,
            photo_url: None,
        })),
    );
    let mut mirror = client.sync.mirror();

    client.session.sign_in().await?;
    client.posts.create(new_post("Blue Wallet")).await?;
    wait_for(&mut mirror, |m| m.is_live() && m.posts.len() == 1).await;

    // the connection drops and resubscription keeps failing
    store.set_offline(true);
    store.disconnect_feeds();
    let degraded = wait_for(&mut mirror, |m| {
        matches!(m.phase, SyncPhase::Degraded { .. })
    })
    .await;
    assert_eq!(
        degraded.posts.len(),
        1,
        "degraded mirror keeps the last known posts"
    );

    // writes issued while the feed is down surface after recovery
    client.posts.create(new_post("Red Keys")).await?;

    store.set_offline(false);
    let recovered = wait_for(&mut mirror, |m| m.is_live() && m.posts.len() == 2).await;
    assert_eq!(recovered.posts[0].title, "Red Keys");

    client.sync.shutdown();
    Ok(())
}
