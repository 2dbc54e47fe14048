//! Hosted document store adapter.
//!
//! The campus backend exposes collections PostgREST-style: JSON row arrays,
//! `?field=eq.value` filters, `Prefer` headers for upsert resolution and
//! representation. The store assigns post ids and creation timestamps
//! through column defaults, so this adapter never sends either.
//!
//! Real-time delivery is a poll loop: each tick refetches the full ordered
//! result set and pushes it into the subscription channel, which satisfies
//! the whole-collection-replace contract by construction. A failed tick
//! closes the channel and leaves reconnecting to the sync service.

use std::time::Duration;

use async_trait::async_trait;
use domains::{
    BoardError, BoardStore, NewPostRecord, PostDocument, PostFeed, PostId, Result, UserProfile,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const FEED_CAPACITY: usize = 8;

#[derive(Clone)]
pub struct RestBoardStore {
    client: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl RestBoardStore {
    /// `base_url` is the collection root, e.g. `https://api.campus.example/rest/v1`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval,
        }
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// The complete current result set, newest first. Unstamped rows sort
    /// last, matching their normalized position in the mirror.
    async fn fetch_posts(&self) -> Result<Vec<PostDocument>> {
        let url = format!(
            "{}?select=*&order=created_at.desc.nullslast",
            self.collection_url("posts")
        );
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| BoardError::Subscription(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BoardError::Subscription(e.to_string()))?;
        if !status.is_success() {
            return Err(BoardError::Subscription(format!(
                "{} -> {}",
                status.as_u16(),
                text
            )));
        }
        serde_json::from_str(&text).map_err(|e| BoardError::Subscription(e.to_string()))
    }

    async fn read_rows(&self, response: reqwest::Response) -> Result<Vec<PostDocument>> {
        let status = response.status();
        let text = response.text().await.map_err(write_err)?;
        if !status.is_success() {
            return Err(BoardError::Write(format!(
                "{} -> {}",
                status.as_u16(),
                text
            )));
        }
        serde_json::from_str(&text).map_err(|e| BoardError::Write(e.to_string()))
    }
}

#[async_trait]
impl BoardStore for RestBoardStore {
    async fn subscribe_posts(&self) -> Result<PostFeed> {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        // fail fast while the caller can still see it; later failures close
        // the channel instead
        let first = self.fetch_posts().await?;
        let _ = tx.send(first).await;

        let store = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(store.poll_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tick.tick().await; // the immediate first tick; already fetched above
            loop {
                tick.tick().await;
                match store.fetch_posts().await {
                    Ok(batch) => {
                        if tx.send(batch).await.is_err() {
                            debug!("post feed receiver dropped; stopping poll");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "post poll failed; closing feed");
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }

    async fn create_post(&self, record: NewPostRecord) -> Result<PostId> {
        let response = self
            .client
            .post(self.collection_url("posts"))
            .headers(self.headers())
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .map_err(write_err)?;
        let rows = self.read_rows(response).await?;
        rows.into_iter()
            .next()
            .map(|doc| doc.id)
            .ok_or_else(|| BoardError::Write("empty representation from insert".to_string()))
    }

    async fn resolve_post(&self, id: &PostId) -> Result<()> {
        let url = format!("{}?id=eq.{}", self.collection_url("posts"), id);
        let response = self
            .client
            .patch(&url)
            .headers(self.headers())
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "status": "resolved" }))
            .send()
            .await
            .map_err(write_err)?;
        let rows = self.read_rows(response).await?;
        if rows.is_empty() {
            return Err(BoardError::NotFound("post".to_string(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_post(&self, id: &PostId) -> Result<()> {
        let url = format!("{}?id=eq.{}", self.collection_url("posts"), id);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(write_err)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BoardError::Write(format!(
                "{} -> {}",
                status.as_u16(),
                text
            )));
        }
        // zero matched rows is still success: delete is idempotent
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        let response = self
            .client
            .post(self.collection_url("profiles"))
            .headers(self.headers())
            .header("Prefer", "resolution=merge-duplicates")
            .json(profile)
            .send()
            .await
            .map_err(write_err)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BoardError::Write(format!(
                "{} -> {}",
                status.as_u16(),
                text
            )));
        }
        Ok(())
    }
}

fn write_err(e: reqwest::Error) -> BoardError {
    BoardError::Write(e.to_string())
}
