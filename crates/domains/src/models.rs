//! # Domain Models
//!
//! These structs represent the core entities of CampusFound. Post ids and
//! creation timestamps are assigned by the document store, never by clients,
//! so ordering stays consistent across clients with skewed clocks.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identity key issued by the provider.
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// Denormalized profile record, upserted on every successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    /// Unused by core logic; kept for staff tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl UserProfile {
    /// Snapshots a provider principal into a profile record.
    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            uid: principal.uid.clone(),
            display_name: principal.display_name.clone(),
            email: principal.email.clone(),
            photo_url: principal.photo_url.clone(),
            role: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Staff,
    Admin,
}

/// Whether the post reports a lost or a found item. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Lost,
    Found,
}

/// Starts `Open`, transitions once to `Resolved`, never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Open,
    Resolved,
}

/// Closed category set, fixed at creation time. Serialized by display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    #[serde(rename = "ID Cards / Wallets")]
    IdCardsWallets,
    Keys,
    #[serde(rename = "Books / Notes")]
    BooksNotes,
    Clothing,
    Accessories,
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Electronics,
        Category::IdCardsWallets,
        Category::Keys,
        Category::BooksNotes,
        Category::Clothing,
        Category::Accessories,
        Category::Others,
    ];

    /// The label shown to users and matched by the search filter.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::IdCardsWallets => "ID Cards / Wallets",
            Category::Keys => "Keys",
            Category::BooksNotes => "Books / Notes",
            Category::Clothing => "Clothing",
            Category::Accessories => "Accessories",
            Category::Others => "Others",
        }
    }
}

/// Store-assigned post key. Unique and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Wire-level post document as stored in the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: PostId,
    pub kind: PostKind,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    /// Calendar date as entered by the creator, kept string-encoded.
    pub date: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    /// Set only when an image was uploaded at creation time.
    pub image_url: Option<String>,
    /// Creator uid; display-only ownership gate for resolve/delete controls.
    pub created_by: String,
    /// Profile snapshot taken at creation; never refreshed afterwards.
    pub creator_name: Option<String>,
    pub creator_photo: Option<String>,
    /// Server-assigned; `None` during the write-latency window before the
    /// store stamps the document.
    pub created_at: Option<DateTime<Utc>>,
    pub status: PostStatus,
}

impl PostDocument {
    /// The mirror view of this document, with the timestamp normalized to a
    /// plain epoch-milliseconds value. An unstamped document surfaces as 0.
    pub fn normalized(self) -> Post {
        Post {
            id: self.id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            location: self.location,
            category: self.category,
            date: self.date,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            image_url: self.image_url,
            created_by: self.created_by,
            creator_name: self.creator_name,
            creator_photo: self.creator_photo,
            created_at: self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0),
            status: self.status,
        }
    }
}

/// Mirror-level post: what filtering and display consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub kind: PostKind,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    pub date: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub created_by: String,
    pub creator_name: Option<String>,
    pub creator_photo: Option<String>,
    /// Epoch milliseconds; 0 when the server stamp has not arrived yet.
    pub created_at: i64,
    pub status: PostStatus,
}

/// Image attached to a new post, uploaded before the document write.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub data: Bytes,
    pub content_type: Mime,
}

/// Caller-supplied fields for a new post. Everything else (`id`,
/// `created_at`, `status`, creator snapshot) is injected by the store and
/// the current session.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub kind: PostKind,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    pub date: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image: Option<ImageAttachment>,
}

/// Document fields persisted for a new post; the store assigns `id` and
/// `created_at` at write time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPostRecord {
    pub kind: PostKind,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    pub date: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub created_by: String,
    pub creator_name: Option<String>,
    pub creator_photo: Option<String>,
    pub status: PostStatus,
}
