//! Image host adapter.
//!
//! The host takes an imgbb-style upload call: the image goes up as a
//! base64-encoded form field under an API key, the JSON response carries
//! the public URL. Payloads that do not look like an image are rejected
//! before spending the network round-trip.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use domains::{BoardError, MediaHost, Result};
use mime::Mime;
use reqwest::Client;
use tracing::debug;

pub struct HttpMediaHost {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpMediaHost {
    /// `endpoint` is the full upload URL, e.g. `https://api.imgbb.com/1/upload`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, data: Bytes, content_type: &Mime) -> Result<String> {
        if content_type.type_() != mime::IMAGE {
            return Err(BoardError::Upload(format!(
                "unsupported content type {content_type}"
            )));
        }
        image::guess_format(&data)
            .map_err(|_| BoardError::Upload("payload is not a recognized image".to_string()))?;

        let encoded = STANDARD.encode(&data);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("image", encoded.as_str())])
            .send()
            .await
            .map_err(|e| BoardError::Upload(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BoardError::Upload(e.to_string()))?;
        if !status.is_success() {
            return Err(BoardError::Upload(format!(
                "{} -> {}",
                status.as_u16(),
                text
            )));
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| BoardError::Upload(e.to_string()))?;
        let url = body
            .pointer("/data/url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BoardError::Upload("no url in host response".to_string()))?;
        debug!(%url, bytes = data.len(), "image uploaded");
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89,
    ];

    #[tokio::test]
    async fn rejects_non_image_content_type_without_network() {
        let host = HttpMediaHost::new("https://img.invalid/upload", "key");
        let err = host
            .upload(Bytes::from_static(b"plain text"), &mime::TEXT_PLAIN)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Upload(_)));
    }

    #[tokio::test]
    async fn rejects_undecodable_payload_without_network() {
        let host = HttpMediaHost::new("https://img.invalid/upload", "key");
        let err = host
            .upload(Bytes::from_static(b"not an image"), &mime::IMAGE_PNG)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Upload(_)));
    }

    #[test]
    fn png_magic_passes_the_sniff() {
        assert!(image::guess_format(PNG).is_ok());
    }
}
