//! In-process media host: content-addressed storage for development
//! profiles and tests. Uploading the same bytes twice yields the same URL.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use domains::{MediaHost, Result};
use mime::Mime;
use sha2::{Digest, Sha256};

pub struct MemoryMediaHost {
    objects: DashMap<String, Bytes>,
    url_prefix: String,
}

impl MemoryMediaHost {
    pub fn new() -> Self {
        Self::with_prefix("memory://media")
    }

    pub fn with_prefix(url_prefix: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for MemoryMediaHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaHost for MemoryMediaHost {
    async fn upload(&self, data: Bytes, _content_type: &Mime) -> Result<String> {
        let hash = hex::encode(Sha256::digest(&data));
        self.objects.insert(hash.clone(), data);
        Ok(format!("{}/{}", self.url_prefix, hash))
    }
}
