//! Record types for the four API collections and the trait that lets one
//! generic view serve all of them.
//!
//! Each record type declares its collection name, its editable form fields,
//! how a draft is built from the form, which filter search it supports, and
//! which child records ("related items") appear when a row is expanded.

mod records;

use crate::form::{Field, FormBuffer};
use crate::view::{Completion, Delivery};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub use records::{
    Address, Album, AlbumDraft, Comment, CommentDraft, Company, Geo, Post, PostDraft, User,
    UserDraft,
};

/// The fixed set of entity views the shell can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Posts,
    Comments,
    Albums,
    Users,
}

impl EntityKind {
    /// Picker order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Posts,
        EntityKind::Comments,
        EntityKind::Albums,
        EntityKind::Users,
    ];

    /// Tab label in the header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Posts => "Posts",
            Self::Comments => "Comments",
            Self::Albums => "Albums",
            Self::Users => "Users",
        }
    }

    /// Lower-case singular noun for status messages ("Created post #101").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Posts => "post",
            Self::Comments => "comment",
            Self::Albums => "album",
            Self::Users => "user",
        }
    }

    /// Parse a kind from a CLI/config name (case-insensitive, singular or plural).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "posts" | "post" => Some(Self::Posts),
            "comments" | "comment" => Some(Self::Comments),
            "albums" | "album" => Some(Self::Albums),
            "users" | "user" => Some(Self::Users),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A filter search over one query parameter, e.g. `posts?userId=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    /// Query parameter name; also the form field holding the filter input.
    pub key: &'static str,
    pub label: &'static str,
}

/// Child records fetched when a row is expanded, e.g. `comments?postId=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedSpec {
    pub collection: &'static str,
    /// Query parameter that points back at the parent id.
    pub key: &'static str,
    pub label: &'static str,
}

/// Summary of a child record shown under an expanded row.
///
/// One shape covers comments (`name`/`body`), photos (`title`/`url`) and
/// posts (`title`/`body`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelatedItem {
    pub id: i64,
    #[serde(alias = "name", default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A record type backed by one REST collection.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + Sized + 'static
{
    const KIND: EntityKind;
    /// Collection path segment, e.g. `"posts"`.
    const COLLECTION: &'static str;
    /// Editable fields, in form order.
    const FIELDS: &'static [Field];
    /// Max characters of a free-text field shown in the list.
    const DISPLAY_LIMIT: usize;
    /// Terminal lines one list row occupies.
    const ROW_HEIGHT: u16;
    const FILTER: Option<FilterSpec>;
    const RELATED: Option<RelatedSpec>;

    /// Body sent on create.
    type Draft: Serialize + fmt::Debug + Send + 'static;

    fn id(&self) -> i64;

    /// Build a create body from the form. `author` is the logged-in account.
    fn draft(form: &FormBuffer, author: Option<i64>) -> Self::Draft;

    /// Copy of `self` with the form's editable fields applied, sent on update.
    fn revise(&self, form: &FormBuffer) -> Self;

    /// First line of the list row.
    fn headline(&self) -> &str;

    /// Second line of the list row; empty for single-line entities.
    fn detail(&self) -> Cow<'_, str>;

    /// Tag a completion with this entity's kind for the app event channel.
    fn deliver(completion: Completion<Self>) -> Delivery;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_name() {
        assert_eq!(EntityKind::from_str_name("Posts"), Some(EntityKind::Posts));
        assert_eq!(EntityKind::from_str_name(" album "), Some(EntityKind::Albums));
        assert_eq!(EntityKind::from_str_name("photos"), None);
    }

    #[test]
    fn test_related_item_accepts_comment_shape() {
        let item: RelatedItem = serde_json::from_str(
            r#"{"postId":1,"id":3,"name":"odio","email":"a@b.c","body":"text"}"#,
        )
        .unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.title, "odio");
        assert_eq!(item.body.as_deref(), Some("text"));
    }

    #[test]
    fn test_related_item_accepts_photo_shape() {
        let item: RelatedItem = serde_json::from_str(
            r#"{"albumId":1,"id":9,"title":"pic","url":"https://x/1.png","thumbnailUrl":"https://x/t.png"}"#,
        )
        .unwrap();
        assert_eq!(item.title, "pic");
        assert_eq!(item.url.as_deref(), Some("https://x/1.png"));
        assert!(item.body.is_none());
    }
}
