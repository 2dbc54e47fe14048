//! # services
//!
//! The application layer of CampusFound: session tracking, the live post
//! mirror, pure filtering, and the three post mutations. Everything here
//! talks to the outside world through the `domains` ports, so backends are
//! swappable and tests run against fakes.

pub mod client;
pub mod filter;
pub mod posts;
pub mod session;
pub mod sync;

pub use client::BoardClient;
pub use filter::{filter_posts, KindFilter};
pub use posts::PostService;
pub use session::SessionService;
pub use sync::{Mirror, PostSync, SyncPhase};
