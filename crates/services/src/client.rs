//! The assembled board client.

use std::sync::Arc;

use domains::{BoardStore, IdentityProvider, MediaHost};

use crate::posts::PostService;
use crate::session::SessionService;
use crate::sync::PostSync;

/// Everything a front end needs, wired over one set of ports.
///
/// Session tracking and the post mirror start on construction and run
/// independently; mutations go through `posts` and surface back through
/// `sync`.
pub struct BoardClient {
    pub session: Arc<SessionService>,
    pub posts: PostService,
    pub sync: PostSync,
}

impl BoardClient {
    pub fn new(
        store: Arc<dyn BoardStore>,
        media: Arc<dyn MediaHost>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let session = Arc::new(SessionService::new(provider, Arc::clone(&store)));
        let sync = PostSync::start(Arc::clone(&store));
        let posts = PostService::new(store, media, Arc::clone(&session));
        Self {
            session,
            posts,
            sync,
        }
    }
}
