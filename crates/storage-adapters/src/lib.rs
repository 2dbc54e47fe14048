//! # storage-adapters
//!
//! Concrete backends for the `domains` storage ports: the hosted document
//! store and image host reached over HTTP, plus in-process equivalents for
//! development profiles and tests. Which backends compile is controlled by
//! features, mirroring what the binary links.

#[cfg(feature = "store-memory")]
pub mod media_memory;
#[cfg(feature = "store-memory")]
pub mod memory;

#[cfg(feature = "media-imgbb")]
pub mod media_http;
#[cfg(feature = "store-rest")]
pub mod rest;

#[cfg(feature = "media-imgbb")]
pub use media_http::HttpMediaHost;
#[cfg(feature = "store-memory")]
pub use media_memory::MemoryMediaHost;
#[cfg(feature = "store-memory")]
pub use memory::MemoryBoardStore;
#[cfg(feature = "store-rest")]
pub use rest::RestBoardStore;
