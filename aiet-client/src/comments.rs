use std::rc::Rc;

use anyhow::{anyhow, Context};
use chrono::Utc;

use crate::{
    api::{
        same_email, Author, Comment, CommentId, CommentRow, KeyValueStore, NewCommentRow, Order,
        OrderType, PostId, Query, RemoteStore, Reply, SessionUser, Table,
    },
    fallback::{remote_or_local, remote_or_try_local},
    storage::comments_key,
    Error, SessionStore,
};

const OLDEST_FIRST: Order = Order::CreationDate(OrderType::Asc);

/// Comment threads of each post
///
/// Every operation goes to the remote store first, and falls back to the
/// local copy of the thread if the remote store fails.
pub struct CommentRepository<R, S> {
    remote: Rc<R>,
    local: S,
    session: Rc<SessionStore<S>>,
}

impl<R: RemoteStore, S: KeyValueStore> CommentRepository<R, S> {
    pub fn new(remote: Rc<R>, local: S, session: Rc<SessionStore<S>>) -> CommentRepository<R, S> {
        CommentRepository {
            remote,
            local,
            session,
        }
    }

    /// All comments of a post, oldest first, each with its replies oldest first
    pub async fn list(&self, post: &PostId) -> Vec<Comment> {
        remote_or_local(
            &format!("listing comments of {post}"),
            self.list_remote(post),
            || self.list_local(post),
        )
        .await
    }

    pub async fn add_comment(&self, post: &PostId, content: &str) -> Result<Comment, Error> {
        let user = self.require_user()?;
        let content = validate(content)?;
        let author = user.author();
        let row = NewCommentRow::new(post.clone(), None, &author, content.clone());
        let res = remote_or_try_local(
            &format!("posting a comment on {post}"),
            self.insert_comment_remote(row),
            || self.add_comment_local(post, author, content),
        )
        .await?;
        tracing::info!(id = %res.id, %post, "posted comment");
        Ok(res)
    }

    pub async fn add_reply(
        &self,
        post: &PostId,
        comment: CommentId,
        content: &str,
    ) -> Result<Reply, Error> {
        let user = self.require_user()?;
        let content = validate(content)?;
        let author = user.author();
        let row = NewCommentRow::new(post.clone(), Some(comment), &author, content.clone());
        let res = remote_or_try_local(
            &format!("replying to comment {comment}"),
            self.insert_reply_remote(row),
            || self.add_reply_local(post, comment, author, content),
        )
        .await?;
        tracing::info!(id = %res.id, parent = %comment, "posted reply");
        Ok(res)
    }

    /// Delete a comment and its replies, returns whether anything was deleted
    ///
    /// Only the author of a comment can delete it. Refusals are logged and
    /// reported as `false`.
    pub async fn delete_comment(&self, post: &PostId, comment: CommentId) -> bool {
        let Some(user) = self.session.current_user() else {
            tracing::warn!(%comment, "refusing to delete a comment without a session");
            return false;
        };
        let remote = remote_or_local(
            &format!("deleting comment {comment}"),
            self.delete_remote(comment, &user),
            || Some(self.delete_local(post, comment, &user)),
        )
        .await;
        // not known remotely, it may have been stored locally while offline
        remote.unwrap_or_else(|| self.delete_local(post, comment, &user))
    }

    fn require_user(&self) -> Result<SessionUser, Error> {
        self.session.current_user().ok_or_else(|| {
            self.session.request_login();
            Error::AuthRequired
        })
    }

    async fn list_remote(&self, post: &PostId) -> anyhow::Result<Vec<Comment>> {
        let top = Query::All(vec![Query::eq("post_id", post), Query::is_null("parent_id")]);
        let rows = self
            .remote
            .select(Table::Comments, &top, OLDEST_FIRST)
            .await
            .with_context(|| format!("fetching comments of {post}"))?;
        let mut res = Vec::with_capacity(rows.len());
        for row in rows {
            let row = parse_row(row)?;
            let replies = self
                .remote
                .select(Table::Comments, &Query::eq("parent_id", row.id), OLDEST_FIRST)
                .await
                .with_context(|| format!("fetching replies to {}", row.id))?
                .into_iter()
                .map(parse_row)
                .collect::<anyhow::Result<Vec<_>>>()?
                .into_iter()
                .filter_map(CommentRow::into_reply)
                .collect();
            res.push(row.into_comment(replies));
        }
        Ok(res)
    }

    async fn insert_remote(&self, row: NewCommentRow) -> anyhow::Result<CommentRow> {
        let row = serde_json::to_value(&row).context("serializing comment row")?;
        let stored = self
            .remote
            .insert(Table::Comments, row)
            .await
            .context("inserting comment row")?;
        parse_row(stored)
    }

    async fn insert_comment_remote(&self, row: NewCommentRow) -> anyhow::Result<Comment> {
        Ok(self.insert_remote(row).await?.into_comment(Vec::new()))
    }

    async fn insert_reply_remote(&self, row: NewCommentRow) -> anyhow::Result<Reply> {
        self.insert_remote(row)
            .await?
            .into_reply()
            .ok_or_else(|| anyhow!("stored reply lost its parent"))
    }

    /// Returns None if the comment is not known to the remote store
    async fn delete_remote(
        &self,
        comment: CommentId,
        user: &SessionUser,
    ) -> anyhow::Result<Option<bool>> {
        let by_id = Query::eq("id", comment);
        let Some(row) = self
            .remote
            .select(Table::Comments, &by_id, OLDEST_FIRST)
            .await
            .with_context(|| format!("fetching comment {comment}"))?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let row = parse_row(row)?;
        if !same_email(&row.author_email, &user.email) {
            tracing::warn!(%comment, user = %user.email, "refusing to delete another member's comment");
            return Ok(Some(false));
        }
        self.remote
            .delete(Table::Comments, &Query::eq("parent_id", comment))
            .await
            .with_context(|| format!("deleting replies to {comment}"))?;
        self.remote
            .delete(Table::Comments, &by_id)
            .await
            .with_context(|| format!("deleting comment {comment}"))?;
        tracing::info!(%comment, "deleted comment");
        Ok(Some(true))
    }

    fn list_local(&self, post: &PostId) -> Vec<Comment> {
        match self.local.get(&comments_key(post)) {
            Ok(comments) => comments.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(?err, %post, "ignoring unreadable local comments");
                Vec::new()
            }
        }
    }

    fn save_local(&self, post: &PostId, comments: &[Comment]) -> anyhow::Result<()> {
        self.local
            .set(&comments_key(post), comments)
            .with_context(|| format!("saving local comments of {post}"))
    }

    fn add_comment_local(
        &self,
        post: &PostId,
        author: Author,
        content: String,
    ) -> Result<Comment, Error> {
        let comment = Comment {
            id: CommentId::new(),
            post_id: post.clone(),
            author,
            content,
            timestamp: Utc::now(),
            replies: Vec::new(),
        };
        let mut comments = self.list_local(post);
        comments.push(comment.clone());
        self.save_local(post, &comments)?;
        Ok(comment)
    }

    fn add_reply_local(
        &self,
        post: &PostId,
        parent: CommentId,
        author: Author,
        content: String,
    ) -> Result<Reply, Error> {
        let mut comments = self.list_local(post);
        let comment = comments
            .iter_mut()
            .find(|c| c.id == parent)
            .ok_or(Error::UnknownComment(parent))?;
        let reply = Reply {
            id: CommentId::new(),
            parent_id: parent,
            author,
            content,
            timestamp: Utc::now(),
        };
        comment.replies.push(reply.clone());
        self.save_local(post, &comments)?;
        Ok(reply)
    }

    fn delete_local(&self, post: &PostId, id: CommentId, user: &SessionUser) -> bool {
        let mut comments = self.list_local(post);
        let mine = |cid: CommentId, author: &Author| cid == id && same_email(&author.email, &user.email);
        let before = comments.len();
        comments.retain(|c| !mine(c.id, &c.author));
        let mut found = comments.len() != before;
        for c in comments.iter_mut() {
            let before = c.replies.len();
            c.replies.retain(|r| !mine(r.id, &r.author));
            found |= c.replies.len() != before;
        }
        if !found {
            tracing::warn!(%id, user = %user.email, "no local comment to delete");
            return false;
        }
        match self.save_local(post, &comments) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(?err, %id, "failed deleting local comment");
                false
            }
        }
    }
}

fn parse_row(row: serde_json::Value) -> anyhow::Result<CommentRow> {
    serde_json::from_value(row).context("parsing comment row")
}

fn validate(content: &str) -> Result<String, Error> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Validation(String::from(
            "Please write something first.",
        )));
    }
    Ok(String::from(content))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use aiet_mock_server::MockServer;
    use serde_json::json;

    use crate::{
        api::{Member, Role},
        fixture::{Fixture, JOSEPH, NAMSOO},
        Directory, SessionEvent,
    };

    use super::*;

    fn post() -> PostId {
        PostId::new("keynote-krajcik")
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate("  hello\n").unwrap(), "hello");
        assert!(matches!(validate(" \n\t "), Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn threads_online() {
        let f = Fixture::new();
        let comments = &f.client.comments;
        f.login(JOSEPH);
        let first = comments.add_comment(&post(), "  First! ").await.unwrap();
        assert_eq!(first.content, "First!");
        assert_eq!(first.author.name, "Joseph Krajcik");
        assert_eq!(first.author.role, Role::SteeringBoard);
        let second = comments.add_comment(&post(), "Second").await.unwrap();
        f.server.test_set_column(
            Table::Comments,
            &first.id.to_string(),
            "created_at",
            json!("2025-12-01T10:00:00Z"),
        );
        f.server.test_set_column(
            Table::Comments,
            &second.id.to_string(),
            "created_at",
            json!("2025-12-01T11:00:00Z"),
        );

        f.login(NAMSOO);
        let reply = comments.add_reply(&post(), first.id, "Agreed").await.unwrap();
        assert_eq!(reply.parent_id, first.id);
        comments
            .add_comment(&PostId::new("other-post"), "Elsewhere")
            .await
            .unwrap();

        let list = comments.list(&post()).await;
        assert_eq!(list.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);
        assert_eq!(list[0].replies.len(), 1);
        assert_eq!(list[0].replies[0].author.name, "Namsoo Shin");
        assert_eq!(list[0].replies[0].author.role, Role::CoOrganizer);
        assert!(list[1].replies.is_empty());
        assert!(f.storage.keys().iter().all(|k| !k.starts_with("aiet_comments_")));
    }

    #[tokio::test]
    async fn requires_login_and_content() {
        let f = Fixture::new();
        let res = f.client.comments.add_comment(&post(), "Hello").await;
        assert!(matches!(res, Err(Error::AuthRequired)));
        assert_eq!(*f.events.borrow(), vec![SessionEvent::LoginRequested]);
        assert_eq!(f.server.test_num_rows(Table::Comments), 0);

        f.login(JOSEPH);
        let res = f.client.comments.add_comment(&post(), "   ").await;
        assert!(matches!(res, Err(Error::Validation(_))));
        assert_eq!(f.server.test_num_rows(Table::Comments), 0);
    }

    #[tokio::test]
    async fn only_authors_delete() {
        let f = Fixture::new();
        let comments = &f.client.comments;
        f.login(JOSEPH);
        let c = comments.add_comment(&post(), "Mine").await.unwrap();
        f.login(NAMSOO);
        comments.add_reply(&post(), c.id, "A reply").await.unwrap();

        assert!(!comments.delete_comment(&post(), c.id).await);
        assert_eq!(comments.list(&post()).await.len(), 1);

        f.client.session.logout();
        assert!(!comments.delete_comment(&post(), c.id).await);

        f.login(JOSEPH);
        assert!(comments.delete_comment(&post(), c.id).await);
        assert!(comments.list(&post()).await.is_empty());
        assert_eq!(f.server.test_num_rows(Table::Comments), 0);
    }

    #[tokio::test]
    async fn replies_keep_their_order() {
        let f = Fixture::new();
        let comments = &f.client.comments;
        f.login(JOSEPH);
        let c = comments.add_comment(&post(), "Question").await.unwrap();
        let r1 = comments.add_reply(&post(), c.id, "First answer").await.unwrap();
        f.login(NAMSOO);
        let r2 = comments.add_reply(&post(), c.id, "Second answer").await.unwrap();
        let r3 = comments.add_reply(&post(), c.id, "Third answer").await.unwrap();
        f.server.test_set_column(
            Table::Comments,
            &r1.id.to_string(),
            "created_at",
            json!("2025-12-01T10:00:00Z"),
        );
        f.server.test_set_column(
            Table::Comments,
            &r2.id.to_string(),
            "created_at",
            json!("2025-12-01T10:05:00Z"),
        );
        f.server.test_set_column(
            Table::Comments,
            &r3.id.to_string(),
            "created_at",
            json!("2025-12-01T10:10:00Z"),
        );

        let list = comments.list(&post()).await;
        assert_eq!(list.len(), 1);
        assert_eq!(
            list[0].replies.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![r1.id, r2.id, r3.id]
        );
        assert!(list[0].replies.iter().all(|r| r.parent_id == c.id));
    }

    #[tokio::test]
    async fn deleting_leaves_other_threads() {
        let f = Fixture::new();
        let comments = &f.client.comments;
        f.login(JOSEPH);
        let a = comments.add_comment(&post(), "Thread A").await.unwrap();
        let b = comments.add_comment(&post(), "Thread B").await.unwrap();
        f.login(NAMSOO);
        comments.add_reply(&post(), a.id, "On A").await.unwrap();
        let on_b = comments.add_reply(&post(), b.id, "On B").await.unwrap();

        f.login(JOSEPH);
        assert!(comments.delete_comment(&post(), a.id).await);
        let list = comments.list(&post()).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, b.id);
        assert_eq!(list[0].replies, vec![on_b]);
        assert_eq!(f.server.test_num_rows(Table::Comments), 2);
    }

    #[tokio::test]
    async fn offline_fallback() {
        let f = Fixture::new();
        let comments = &f.client.comments;
        f.login(JOSEPH);
        comments.add_comment(&post(), "Online").await.unwrap();

        f.server.set_offline(true);
        assert!(comments.list(&post()).await.is_empty());
        let c = comments.add_comment(&post(), "Offline").await.unwrap();
        let r = comments.add_reply(&post(), c.id, "Offline reply").await.unwrap();
        let unknown = comments.add_reply(&post(), CommentId::new(), "Lost").await;
        assert!(matches!(unknown, Err(Error::UnknownComment(_))));

        let list = comments.list(&post()).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].content, "Offline");
        assert_eq!(list[0].replies, vec![r.clone()]);
        assert!(f.storage.get_raw("aiet_comments_keynote-krajcik").is_some());

        // deleting a reply only removes the reply
        assert!(comments.delete_comment(&post(), r.id).await);
        assert!(comments.list(&post()).await[0].replies.is_empty());

        // back online, locally stored comments are still deletable
        f.server.set_offline(false);
        assert_eq!(comments.list(&post()).await.len(), 1);
        assert!(comments.delete_comment(&post(), c.id).await);
        f.server.set_offline(true);
        assert!(comments.list(&post()).await.is_empty());
    }

    #[tokio::test]
    async fn author_is_a_snapshot() {
        let server = Rc::new(MockServer::new());
        let before = Fixture::with_directory(
            server.clone(),
            Directory::new(vec![Member::new(JOSEPH, "Joseph Krajcik", Role::Speaker, "MSU")]),
        );
        before.login(JOSEPH);
        let c = before.client.comments.add_comment(&post(), "Hi").await.unwrap();

        let after = Fixture::with_directory(server.clone(), Directory::conference());
        let list = after.client.comments.list(&post()).await;
        assert_eq!(list[0].author.role, Role::Speaker);
        assert_eq!(list[0].author.affiliation, "MSU");

        server.test_set_column(Table::Comments, &c.id.to_string(), "author_role", json!(null));
        let list = after.client.comments.list(&post()).await;
        assert_eq!(list[0].author.role, Role::Member);
    }

    #[tokio::test]
    async fn unreadable_local_threads_are_empty() {
        let f = Fixture::new();
        f.server.set_offline(true);
        f.storage
            .set_raw("aiet_comments_keynote-krajcik", String::from("[{]"))
            .unwrap();
        assert!(f.client.comments.list(&post()).await.is_empty());
        f.login(JOSEPH);
        let c = f.client.comments.add_comment(&post(), "Fresh").await.unwrap();
        assert_eq!(f.client.comments.list(&post()).await, vec![c]);
    }
}
