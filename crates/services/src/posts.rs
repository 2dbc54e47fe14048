//! Post mutations: create, resolve, delete.
//!
//! Every operation is a remote write. The local mirror is never touched
//! here — the sync listener observes the store change and republishes, so
//! callers must not expect a mutation's effect to be visible the moment the
//! call returns.

use std::sync::Arc;

use domains::{
    BoardError, BoardStore, MediaHost, NewPost, NewPostRecord, PostId, PostStatus, Principal,
    Result,
};
use tracing::{info, instrument, warn};

use crate::session::SessionService;

pub struct PostService {
    store: Arc<dyn BoardStore>,
    media: Arc<dyn MediaHost>,
    session: Arc<SessionService>,
}

impl PostService {
    pub fn new(
        store: Arc<dyn BoardStore>,
        media: Arc<dyn MediaHost>,
        session: Arc<SessionService>,
    ) -> Self {
        Self {
            store,
            media,
            session,
        }
    }

    /// Creates a post from the caller-supplied fields.
    ///
    /// The image, if any, is uploaded first; an upload failure aborts the
    /// whole operation before any document write. Status is forced to Open
    /// and the creator snapshot comes from the current session.
    #[instrument(skip(self, new), fields(kind = ?new.kind))]
    pub async fn create(&self, new: NewPost) -> Result<PostId> {
        let principal = self.require_session()?;
        validate(&new)?;

        let image_url = match &new.image {
            Some(attachment) => Some(
                self.media
                    .upload(attachment.data.clone(), &attachment.content_type)
                    .await?,
            ),
            None => None,
        };

        let record = NewPostRecord {
            kind: new.kind,
            title: new.title,
            description: new.description,
            location: new.location,
            category: new.category,
            date: new.date,
            contact_email: new.contact_email,
            contact_phone: new.contact_phone,
            image_url: image_url.clone(),
            created_by: principal.uid,
            creator_name: principal.display_name,
            creator_photo: principal.photo_url,
            status: PostStatus::Open,
        };

        match self.store.create_post(record).await {
            Ok(id) => {
                info!(%id, "post created");
                Ok(id)
            }
            Err(e) => {
                if let Some(url) = image_url {
                    // the upload cannot be rolled back; the hosted image is
                    // abandoned
                    warn!(%url, "post write failed after image upload; image orphaned");
                }
                Err(e)
            }
        }
    }

    /// Flips an open post to resolved. Resolving an already-resolved post
    /// is a no-op success; the transition never reverts.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &PostId) -> Result<()> {
        self.require_session()?;
        self.store.resolve_post(id).await
    }

    /// Removes a post permanently. Deleting an id that no longer exists is
    /// a no-op success.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &PostId) -> Result<()> {
        self.require_session()?;
        self.store.delete_post(id).await
    }

    /// Display-only ownership gate: whether resolve/delete controls should
    /// be offered for a post created by `created_by`.
    pub fn owns(&self, created_by: &str) -> bool {
        self.session
            .current()
            .is_some_and(|p| p.uid == created_by)
    }

    fn require_session(&self) -> Result<Principal> {
        self.session.current().ok_or(BoardError::AuthRequired)
    }
}

fn validate(new: &NewPost) -> Result<()> {
    let required = [
        ("title", &new.title),
        ("description", &new.description),
        ("location", &new.location),
        ("date", &new.date),
        ("contact email", &new.contact_email),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(BoardError::Validation(format!("{field} is required")));
        }
    }
    Ok(())
}
