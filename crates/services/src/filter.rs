//! Pure filtering of the post mirror.
//!
//! Stateless and synchronous: the caller hands in the current mirror
//! contents plus the search controls and gets back the surviving subset in
//! the original order. Calling it twice with the same inputs yields
//! structurally equal output.

use domains::{Post, PostKind};
use serde::{Deserialize, Serialize};

/// Kind selector for the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Lost,
    Found,
}

impl KindFilter {
    fn admits(self, kind: PostKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Lost => kind == PostKind::Lost,
            KindFilter::Found => kind == PostKind::Found,
        }
    }
}

/// Returns the posts matching `query` and `kind`, preserving input order.
///
/// Matching is a case-insensitive substring test over title, description,
/// location and category label; an empty query matches everything. The
/// query is deliberately not trimmed, so a whitespace-only query performs a
/// literal substring match.
pub fn filter_posts(posts: &[Post], query: &str, kind: KindFilter) -> Vec<Post> {
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|p| kind.admits(p.kind))
        .filter(|p| needle.is_empty() || matches_query(p, &needle))
        .cloned()
        .collect()
}

fn matches_query(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.description.to_lowercase().contains(needle)
        || post.location.to_lowercase().contains(needle)
        || post.category.label().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Category, PostId, PostStatus};

    fn post(id: &str, kind: PostKind, title: &str, created_at: i64) -> Post {
        Post {
            id: PostId::from(id),
            kind,
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
            category: Category::Others,
            date: "2026-08-01".to_string(),
            contact_email: "x@campus.edu".to_string(),
            contact_phone: None,
            image_url: None,
            created_by: "u-1".to_string(),
            creator_name: None,
            creator_photo: None,
            created_at,
            status: PostStatus::Open,
        }
    }

    fn mirror() -> Vec<Post> {
        vec![
            post("b", PostKind::Found, "Red Keys", 200),
            post("a", PostKind::Lost, "Blue Wallet", 100),
        ]
    }

    #[test]
    fn identity_law() {
        let m = mirror();
        assert_eq!(filter_posts(&m, "", KindFilter::All), m);
    }

    #[test]
    fn idempotent() {
        let m = mirror();
        let once = filter_posts(&m, "e", KindFilter::All);
        let twice = filter_posts(&once, "e", KindFilter::All);
        assert_eq!(once, twice);
    }

    #[test]
    fn kind_partition() {
        let m = mirror();
        let lost = filter_posts(&m, "", KindFilter::Lost);
        assert!(lost.iter().all(|p| p.kind == PostKind::Lost));
        let found = filter_posts(&m, "", KindFilter::Found);
        assert!(found.iter().all(|p| p.kind == PostKind::Found));
        assert_eq!(lost.len() + found.len(), m.len());
    }

    #[test]
    fn case_insensitive() {
        let m = mirror();
        assert_eq!(
            filter_posts(&m, "BACKPACK", KindFilter::All),
            filter_posts(&m, "backpack", KindFilter::All)
        );
        assert_eq!(filter_posts(&m, "WALLET", KindFilter::All).len(), 1);
    }

    #[test]
    fn substring_over_all_searched_fields() {
        let mut p = post("c", PostKind::Lost, "Something", 300);
        p.location = "Engineering Hall".to_string();
        p.category = Category::Electronics;
        let m = vec![p];
        assert_eq!(filter_posts(&m, "engineering", KindFilter::All).len(), 1);
        assert_eq!(filter_posts(&m, "electron", KindFilter::All).len(), 1);
        assert!(filter_posts(&m, "wallet", KindFilter::All).is_empty());
    }

    #[test]
    fn preserves_order() {
        let m = mirror();
        let all = filter_posts(&m, "e", KindFilter::All);
        // both titles contain an 'e'; order must match the mirror
        assert_eq!(all[0].id, PostId::from("b"));
        assert_eq!(all[1].id, PostId::from("a"));
    }

    #[test]
    fn key_query_selects_the_found_keys() {
        let m = mirror();
        let hits = filter_posts(&m, "key", KindFilter::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, PostId::from("b"));
    }

    #[test]
    fn whitespace_query_is_literal() {
        let mut p = post("d", PostKind::Lost, "two  spaces", 400);
        p.description = "plain".to_string();
        let m = vec![p, post("e", PostKind::Lost, "one space", 500)];
        let hits = filter_posts(&m, "  ", KindFilter::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, PostId::from("d"));
    }

    #[test]
    fn no_match_is_empty_not_loading() {
        let m = mirror();
        assert!(filter_posts(&m, "zzz", KindFilter::All).is_empty());
    }
}
