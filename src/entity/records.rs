use super::{Entity, EntityKind, FilterSpec, RelatedSpec};
use crate::form::{Field, FormBuffer};
use crate::view::{Completion, Delivery};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// ============================================================================
// Post
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub body: String,
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Posts;
    const COLLECTION: &'static str = "posts";
    const FIELDS: &'static [Field] = &[
        Field::required("title", "Title"),
        Field::required("body", "Body"),
    ];
    const DISPLAY_LIMIT: usize = 220;
    const ROW_HEIGHT: u16 = 2;
    const FILTER: Option<FilterSpec> = Some(FilterSpec {
        key: "userId",
        label: "User id",
    });
    const RELATED: Option<RelatedSpec> = Some(RelatedSpec {
        collection: "comments",
        key: "postId",
        label: "Comments",
    });

    type Draft = PostDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(form: &FormBuffer, author: Option<i64>) -> PostDraft {
        PostDraft {
            user_id: author,
            title: form.get("title").to_string(),
            body: form.get("body").to_string(),
        }
    }

    fn revise(&self, form: &FormBuffer) -> Self {
        Self {
            title: form.get("title").to_string(),
            body: form.get("body").to_string(),
            ..self.clone()
        }
    }

    fn headline(&self) -> &str {
        &self.title
    }

    fn detail(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.body)
    }

    fn deliver(completion: Completion<Self>) -> Delivery {
        Delivery::Posts(completion)
    }
}

// ============================================================================
// Comment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentDraft {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl Entity for Comment {
    const KIND: EntityKind = EntityKind::Comments;
    const COLLECTION: &'static str = "comments";
    const FIELDS: &'static [Field] = &[
        Field::required("name", "Name"),
        Field::required("email", "Email"),
        Field::required("body", "Body"),
    ];
    const DISPLAY_LIMIT: usize = 220;
    const ROW_HEIGHT: u16 = 2;
    const FILTER: Option<FilterSpec> = Some(FilterSpec {
        key: "postId",
        label: "Post id",
    });
    const RELATED: Option<RelatedSpec> = None;

    type Draft = CommentDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(form: &FormBuffer, _author: Option<i64>) -> CommentDraft {
        CommentDraft {
            name: form.get("name").to_string(),
            email: form.get("email").to_string(),
            body: form.get("body").to_string(),
        }
    }

    fn revise(&self, form: &FormBuffer) -> Self {
        Self {
            name: form.get("name").to_string(),
            email: form.get("email").to_string(),
            body: form.get("body").to_string(),
            ..self.clone()
        }
    }

    fn headline(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> Cow<'_, str> {
        Cow::Owned(format!("<{}> {}", self.email, self.body))
    }

    fn deliver(completion: Completion<Self>) -> Delivery {
        Delivery::Comments(completion)
    }
}

// ============================================================================
// Album
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
}

impl Entity for Album {
    const KIND: EntityKind = EntityKind::Albums;
    const COLLECTION: &'static str = "albums";
    const FIELDS: &'static [Field] = &[Field::required("title", "Album title")];
    const DISPLAY_LIMIT: usize = 220;
    const ROW_HEIGHT: u16 = 1;
    const FILTER: Option<FilterSpec> = Some(FilterSpec {
        key: "userId",
        label: "User id",
    });
    const RELATED: Option<RelatedSpec> = Some(RelatedSpec {
        collection: "photos",
        key: "albumId",
        label: "Photos",
    });

    type Draft = AlbumDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(form: &FormBuffer, author: Option<i64>) -> AlbumDraft {
        AlbumDraft {
            user_id: author,
            title: form.get("title").to_string(),
        }
    }

    fn revise(&self, form: &FormBuffer) -> Self {
        Self {
            title: form.get("title").to_string(),
            ..self.clone()
        }
    }

    fn headline(&self) -> &str {
        &self.title
    }

    fn detail(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn deliver(completion: Completion<Self>) -> Delivery {
        Delivery::Albums(completion)
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

/// A remote API user. Not to be confused with a local session account.
///
/// Users created through the API come back with only `username` and `email`,
/// so everything else defaults to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::Users;
    const COLLECTION: &'static str = "users";
    const FIELDS: &'static [Field] = &[
        Field::required("username", "Username"),
        Field::required("email", "Email"),
    ];
    const DISPLAY_LIMIT: usize = 60;
    const ROW_HEIGHT: u16 = 2;
    const FILTER: Option<FilterSpec> = None;
    const RELATED: Option<RelatedSpec> = Some(RelatedSpec {
        collection: "posts",
        key: "userId",
        label: "Posts",
    });

    type Draft = UserDraft;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(form: &FormBuffer, _author: Option<i64>) -> UserDraft {
        UserDraft {
            username: form.get("username").to_string(),
            email: form.get("email").to_string(),
        }
    }

    fn revise(&self, form: &FormBuffer) -> Self {
        Self {
            username: form.get("username").to_string(),
            email: form.get("email").to_string(),
            ..self.clone()
        }
    }

    fn headline(&self) -> &str {
        &self.username
    }

    fn detail(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.email)
    }

    fn deliver(completion: Completion<Self>) -> Delivery {
        Delivery::Users(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::form_fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_post_draft_carries_author() {
        let mut form = FormBuffer::new(form_fields::<Post>());
        form.set("title", "C");
        form.set("body", "D");

        let draft = Post::draft(&form, Some(7));
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"userId": 7, "title": "C", "body": "D"})
        );
    }

    #[test]
    fn test_album_draft_without_author_omits_user_id() {
        let mut form = FormBuffer::new(form_fields::<Album>());
        form.set("title", "Holiday");

        let draft = Album::draft(&form, None);
        assert_eq!(serde_json::to_value(&draft).unwrap(), json!({"title": "Holiday"}));
    }

    #[test]
    fn test_user_revise_keeps_untouched_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {"street": "Kulas Light", "suite": "Apt. 556", "city": "Gwenborough",
                        "zipcode": "92998-3874", "geo": {"lat": "-37.3159", "lng": "81.1496"}},
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered", "bs": "e-markets"}
        }))
        .unwrap();

        let mut form = FormBuffer::new(form_fields::<User>());
        form.set("username", "bret2");
        form.set("email", "new@april.biz");

        let revised = user.revise(&form);
        assert_eq!(revised.username, "bret2");
        assert_eq!(revised.email, "new@april.biz");
        assert_eq!(revised.address.city, "Gwenborough");
        assert_eq!(revised.company.catch_phrase, "Multi-layered");
        assert_eq!(revised.id, 1);
    }

    #[test]
    fn test_created_user_parses_with_defaults() {
        let user: User =
            serde_json::from_str(r#"{"username":"u","email":"e@x.com","id":11}"#).unwrap();
        assert_eq!(user.id, 11);
        assert_eq!(user.address, Address::default());
        assert_eq!(user.detail(), "e@x.com");
    }

    #[test]
    fn test_comment_detail_includes_email() {
        let comment = Comment {
            post_id: Some(1),
            id: 2,
            name: "n".into(),
            email: "a@b.c".into(),
            body: "hello".into(),
        };
        assert_eq!(comment.detail(), "<a@b.c> hello");
    }
}
