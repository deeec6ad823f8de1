use std::fmt;

use crate::{Author, Role, Time, Uuid};

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> PostId {
        PostId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn new() -> CommentId {
        CommentId(Uuid::new_v4())
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A top-level comment, with its replies in insertion order
///
/// This is also the layout of the local fallback record, which stores the
/// whole tree of a post as one value.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: Author,
    pub content: String,
    pub timestamp: Time,
    pub replies: Vec<Reply>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: CommentId,
    pub parent_id: CommentId,
    pub author: Author,
    pub content: String,
    pub timestamp: Time,
}

/// One row of the remote comments table, comments and replies alike
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentRow {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_name: String,
    pub author_email: String,
    pub author_role: Option<Role>,
    pub author_affiliation: Option<String>,
    pub content: String,
    pub created_at: Time,
}

impl CommentRow {
    fn author(&self) -> Author {
        Author {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
            role: self.author_role.unwrap_or(Role::Member),
            affiliation: self.author_affiliation.clone().unwrap_or_default(),
        }
    }

    pub fn into_comment(self, replies: Vec<Reply>) -> Comment {
        Comment {
            author: self.author(),
            id: self.id,
            post_id: self.post_id,
            content: self.content,
            timestamp: self.created_at,
            replies,
        }
    }

    /// Returns None if this row has no parent, ie. is not a reply
    pub fn into_reply(self) -> Option<Reply> {
        let parent_id = self.parent_id?;
        Some(Reply {
            author: self.author(),
            id: self.id,
            parent_id,
            content: self.content,
            timestamp: self.created_at,
        })
    }
}

/// Columns sent when inserting a comment; id and created_at are assigned by the store
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewCommentRow {
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_name: String,
    pub author_email: String,
    pub author_role: Role,
    pub author_affiliation: String,
    pub content: String,
}

impl NewCommentRow {
    pub fn new(
        post_id: PostId,
        parent_id: Option<CommentId>,
        author: &Author,
        content: String,
    ) -> NewCommentRow {
        NewCommentRow {
            post_id,
            parent_id,
            author_name: author.name.clone(),
            author_email: author.email.clone(),
            author_role: author.role,
            author_affiliation: author.affiliation.clone(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(parent_id: Option<CommentId>) -> CommentRow {
        serde_json::from_value(serde_json::json!({
            "id": "0b6f2c1e-59a7-4d8e-9d1e-0c0c0c0c0c01",
            "post_id": "keynote-2025",
            "parent_id": parent_id,
            "author_name": "Alice Liddell",
            "author_email": "alice@example.edu",
            "author_role": null,
            "author_affiliation": null,
            "content": "hello",
            "created_at": "2025-12-16T08:30:00Z",
        }))
        .expect("parsing comment row")
    }

    #[test]
    fn nullable_author_columns() {
        let c = row(None).into_comment(Vec::new());
        assert_eq!(c.author.role, Role::Member);
        assert_eq!(c.author.affiliation, "");
        assert_eq!(c.post_id, PostId::new("keynote-2025"));
    }

    #[test]
    fn only_rows_with_parent_are_replies() {
        assert!(row(None).into_reply().is_none());
        let parent = CommentId::new();
        let r = row(Some(parent)).into_reply().expect("row has a parent");
        assert_eq!(r.parent_id, parent);
        assert_eq!(r.content, "hello");
    }
}
