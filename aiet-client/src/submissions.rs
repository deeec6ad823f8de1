use std::rc::Rc;

use anyhow::Context;
use chrono::Utc;

use crate::{
    api::{
        same_email, Attachment, AttachmentPatch, KeyValueStore, NewSubmission, ObjectStorage,
        Order, OrderType, Query, RemoteStore, SessionUser, StatusPatch, StoredAttachment,
        Submission, SubmissionId, SubmissionStatus, SubmissionType, Table, Time,
    },
    fallback::{remote_or_local, remote_or_try_local},
    storage::SUBMISSIONS_KEY,
    Error, SessionStore,
};

const NEWEST_FIRST: Order = Order::CreationDate(OrderType::Desc);

pub const MISSING_FIELDS: &str = "Please fill in all required fields.";

/// Essays, research notes and discussion topics sent by members, and their review
pub struct SubmissionRepository<R, O, S> {
    remote: Rc<R>,
    objects: Rc<O>,
    local: S,
    session: Rc<SessionStore<S>>,
}

impl<R, O, S> SubmissionRepository<R, O, S>
where
    R: RemoteStore,
    O: ObjectStorage,
    S: KeyValueStore,
{
    pub fn new(
        remote: Rc<R>,
        objects: Rc<O>,
        local: S,
        session: Rc<SessionStore<S>>,
    ) -> SubmissionRepository<R, O, S> {
        SubmissionRepository {
            remote,
            objects,
            local,
            session,
        }
    }

    /// Create a pending submission, and attach `attachment` to it if given
    ///
    /// A failed upload is logged and leaves the submission without attachment.
    /// If the remote store is down, the submission is kept locally without
    /// its attachment.
    pub async fn submit(
        &self,
        kind: &str,
        title: &str,
        content: &str,
        tags: &str,
        attachment: Option<Attachment>,
    ) -> Result<Submission, Error> {
        let user = self.session.current_user().ok_or_else(|| {
            self.session.request_login();
            Error::AuthRequired
        })?;
        let (title, content) = (title.trim(), content.trim());
        if kind.trim().is_empty() || title.is_empty() || content.is_empty() {
            return Err(Error::Validation(String::from(MISSING_FIELDS)));
        }
        let kind = kind
            .trim()
            .parse::<SubmissionType>()
            .map_err(|e| Error::Validation(e.to_string()))?;
        let new = NewSubmission {
            kind,
            title: String::from(title),
            content: String::from(content),
            tags: String::from(tags.trim()),
            author_name: user.name.clone(),
            author_email: user.email.clone(),
            author_affiliation: user.affiliation.clone(),
            status: SubmissionStatus::Pending,
        };
        let res = remote_or_try_local(
            "storing a submission",
            self.submit_remote(new.clone(), attachment.as_ref()),
            || self.submit_local(new, attachment.is_some()),
        )
        .await?;
        tracing::info!(id = %res.id, kind = res.kind.as_str(), "received submission");
        Ok(res)
    }

    /// Every submission, newest first, optionally only those with `status`
    ///
    /// Only the administrator may list them, others get an empty list.
    pub async fn list_all(&self, status: Option<SubmissionStatus>) -> Vec<Submission> {
        if !self.session.is_admin() {
            tracing::error!("listing all submissions requires the administrator");
            return Vec::new();
        }
        let query = Query::All(status.map(|s| Query::eq("status", s.as_str())).into_iter().collect());
        self.list("listing all submissions", query).await
    }

    /// Submissions of the logged-in member, newest first
    pub async fn list_mine(&self) -> Vec<Submission> {
        let Some(user) = self.session.current_user() else {
            return Vec::new();
        };
        self.list("listing own submissions", Query::eq("author_email", &user.email))
            .await
    }

    /// Approved submissions, newest first, optionally only those of one type
    pub async fn list_approved(&self, kind: Option<SubmissionType>) -> Vec<Submission> {
        let mut filters = vec![Query::eq("status", SubmissionStatus::Approved.as_str())];
        filters.extend(kind.map(|k| Query::eq("type", k.as_str())));
        self.list("listing approved submissions", Query::All(filters))
            .await
    }

    /// Review a submission, returns whether it was updated
    pub async fn set_status(&self, id: SubmissionId, status: SubmissionStatus) -> bool {
        if !self.session.is_admin() {
            tracing::error!(%id, "reviewing submissions requires the administrator");
            return false;
        }
        let now = Utc::now();
        let res = remote_or_local(
            &format!("setting status of submission {id}"),
            self.set_status_remote(id, status, now),
            || self.set_status_local(id, status, now),
        )
        .await;
        if res {
            tracing::info!(%id, status = status.as_str(), "reviewed submission");
        }
        res
    }

    /// Delete a submission and its attachment, returns whether it was deleted
    ///
    /// The administrator can delete any submission, other members only theirs.
    pub async fn delete(&self, id: SubmissionId) -> bool {
        let Some(user) = self.session.current_user() else {
            tracing::warn!(%id, "refusing to delete a submission without a session");
            return false;
        };
        let admin = self.session.is_admin();
        let remote = remote_or_local(
            &format!("deleting submission {id}"),
            self.delete_remote(id, &user, admin),
            || Some(self.delete_local(id, &user, admin)),
        )
        .await;
        remote.unwrap_or_else(|| self.delete_local(id, &user, admin))
    }

    async fn list(&self, what: &str, query: Query) -> Vec<Submission> {
        remote_or_local(what, self.list_remote(&query), || self.list_local(&query)).await
    }

    async fn submit_remote(
        &self,
        new: NewSubmission,
        attachment: Option<&Attachment>,
    ) -> anyhow::Result<Submission> {
        let row = serde_json::to_value(&new).context("serializing submission")?;
        let stored = self
            .remote
            .insert(Table::Submissions, row)
            .await
            .context("inserting submission")?;
        let mut res: Submission = parse_row(stored)?;
        if let Some(attachment) = attachment {
            match self.attach(res.id, attachment).await {
                Ok(stored) => {
                    res.attachment_name = Some(stored.name);
                    res.attachment_url = Some(stored.url);
                    res.attachment_path = Some(stored.path);
                }
                Err(err) => tracing::error!(
                    ?err,
                    id = %res.id,
                    "failed storing attachment, keeping submission without it"
                ),
            }
        }
        Ok(res)
    }

    /// Upload `attachment` and record it on the submission
    async fn attach(
        &self,
        id: SubmissionId,
        attachment: &Attachment,
    ) -> anyhow::Result<StoredAttachment> {
        let path = attachment_path(id, attachment, Utc::now().timestamp_millis());
        self.objects
            .upload(&path, &attachment.content_type, attachment.bytes.clone())
            .await
            .with_context(|| format!("uploading attachment to {path}"))?;
        let stored = StoredAttachment {
            name: attachment.name.clone(),
            url: self.objects.public_url(&path),
            path,
        };
        let patch = serde_json::to_value(AttachmentPatch::from(stored.clone()))
            .context("serializing attachment patch")?;
        if let Err(err) = self
            .remote
            .update(Table::Submissions, &Query::eq("id", id), patch)
            .await
        {
            if let Err(err) = self.objects.remove(&stored.path).await {
                tracing::warn!(?err, path = %stored.path, "failed removing orphan attachment");
            }
            return Err(err).with_context(|| format!("recording attachment of {id}"));
        }
        Ok(stored)
    }

    async fn list_remote(&self, query: &Query) -> anyhow::Result<Vec<Submission>> {
        self.remote
            .select(Table::Submissions, query, NEWEST_FIRST)
            .await
            .context("fetching submissions")?
            .into_iter()
            .map(parse_row)
            .collect()
    }

    async fn set_status_remote(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        now: Time,
    ) -> anyhow::Result<bool> {
        let patch = serde_json::to_value(StatusPatch {
            status,
            updated_at: now,
        })
        .context("serializing status patch")?;
        self.remote
            .update(Table::Submissions, &Query::eq("id", id), patch)
            .await
            .with_context(|| format!("updating status of {id}"))?;
        Ok(true)
    }

    /// Returns None if the submission is not known to the remote store
    async fn delete_remote(
        &self,
        id: SubmissionId,
        user: &SessionUser,
        admin: bool,
    ) -> anyhow::Result<Option<bool>> {
        let by_id = Query::eq("id", id);
        let Some(row) = self
            .remote
            .select(Table::Submissions, &by_id, NEWEST_FIRST)
            .await
            .with_context(|| format!("fetching submission {id}"))?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let sub = parse_row(row)?;
        if !admin && !same_email(&sub.author_email, &user.email) {
            tracing::warn!(%id, user = %user.email, "refusing to delete another member's submission");
            return Ok(Some(false));
        }
        self.remote
            .delete(Table::Submissions, &by_id)
            .await
            .with_context(|| format!("deleting submission {id}"))?;
        if let Some(path) = &sub.attachment_path {
            if let Err(err) = self.objects.remove(path).await {
                tracing::warn!(?err, %path, "failed removing attachment of deleted submission");
            }
        }
        tracing::info!(%id, "deleted submission");
        Ok(Some(true))
    }

    fn load_local(&self) -> Vec<Submission> {
        match self.local.get(SUBMISSIONS_KEY) {
            Ok(subs) => subs.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(?err, "ignoring unreadable local submissions");
                Vec::new()
            }
        }
    }

    fn save_local(&self, subs: &[Submission]) -> anyhow::Result<()> {
        self.local
            .set(SUBMISSIONS_KEY, subs)
            .context("saving local submissions")
    }

    fn submit_local(&self, new: NewSubmission, had_attachment: bool) -> Result<Submission, Error> {
        if had_attachment {
            tracing::error!("attachments cannot be stored while the remote store is down, dropping it");
        }
        let sub = new.into_local(SubmissionId::new(), Utc::now());
        let mut subs = self.load_local();
        subs.push(sub.clone());
        self.save_local(&subs)?;
        Ok(sub)
    }

    fn list_local(&self, query: &Query) -> Vec<Submission> {
        let mut res = self
            .load_local()
            .into_iter()
            .filter(|s| serde_json::to_value(s).map_or(false, |v| query.matches(&v)))
            .collect::<Vec<_>>();
        res.sort_by(|a, b| NEWEST_FIRST.compare(&a.created_at, &b.created_at));
        res
    }

    fn set_status_local(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        now: Time,
    ) -> bool {
        let mut subs = self.load_local();
        let Some(sub) = subs.iter_mut().find(|s| s.id == id) else {
            tracing::warn!(%id, "no local submission to review");
            return false;
        };
        sub.status = status;
        sub.updated_at = Some(now);
        match self.save_local(&subs) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(?err, %id, "failed reviewing local submission");
                false
            }
        }
    }

    fn delete_local(&self, id: SubmissionId, user: &SessionUser, admin: bool) -> bool {
        let mut subs = self.load_local();
        let Some(pos) = subs.iter().position(|s| s.id == id) else {
            tracing::warn!(%id, "no local submission to delete");
            return false;
        };
        if !admin && !same_email(&subs[pos].author_email, &user.email) {
            tracing::warn!(%id, user = %user.email, "refusing to delete another member's submission");
            return false;
        }
        subs.remove(pos);
        match self.save_local(&subs) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(?err, %id, "failed deleting local submission");
                false
            }
        }
    }
}

fn parse_row(row: serde_json::Value) -> anyhow::Result<Submission> {
    serde_json::from_value(row).context("parsing submission row")
}

/// Object path of an attachment, unique per submission and upload time
pub fn attachment_path(id: SubmissionId, attachment: &Attachment, unix_millis: i64) -> String {
    match attachment.extension() {
        Some(ext) => format!("submissions/{id}_{unix_millis}.{ext}"),
        None => format!("submissions/{id}_{unix_millis}"),
    }
}

#[cfg(test)]
mod tests {
    use aiet_mock_server::MOCK_STORAGE_URL;
    use serde_json::json;

    use crate::{
        api::uuid,
        fixture::{Fixture, ADMIN, JOSEPH, NAMSOO},
        SessionEvent,
    };

    use super::*;

    fn pdf() -> Attachment {
        Attachment {
            name: String::from("poster.pdf"),
            content_type: String::from("application/pdf"),
            bytes: b"%PDF-1.7".to_vec(),
        }
    }

    #[test]
    fn attachment_paths() {
        let id = SubmissionId(uuid!("6c1b1b4e-8a9f-4f0e-9d56-1f8b3c2a7e01"));
        let mut a = pdf();
        a.name = String::from("slides.final.pdf");
        assert_eq!(
            attachment_path(id, &a, 1_700_000_000_000),
            "submissions/6c1b1b4e-8a9f-4f0e-9d56-1f8b3c2a7e01_1700000000000.pdf"
        );
        a.name = String::from("README");
        assert_eq!(
            attachment_path(id, &a, 42),
            "submissions/6c1b1b4e-8a9f-4f0e-9d56-1f8b3c2a7e01_42"
        );
    }

    #[tokio::test]
    async fn review_workflow() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.login(JOSEPH);
        let paper = subs
            .submit("research", " Learning progressions ", "Abstract", "ai, assessment", None)
            .await
            .unwrap();
        assert_eq!(paper.status, SubmissionStatus::Pending);
        assert_eq!(paper.title, "Learning progressions");
        assert_eq!(paper.author_name, "Joseph Krajcik");
        assert_eq!(paper.tag_list(), vec!["ai", "assessment"]);
        assert!(!paper.has_attachment());
        let poster = subs.submit("essay", "Poster", "Body", "", None).await.unwrap();

        assert!(subs.list_all(None).await.is_empty());
        assert!(!subs.set_status(paper.id, SubmissionStatus::Approved).await);
        assert!(subs.list_approved(None).await.is_empty());
        assert_eq!(subs.list_mine().await.len(), 2);

        f.login(ADMIN);
        assert!(subs.list_mine().await.is_empty());
        assert_eq!(subs.list_all(None).await.len(), 2);
        assert!(subs.set_status(paper.id, SubmissionStatus::Approved).await);
        assert!(subs.set_status(poster.id, SubmissionStatus::Rejected).await);
        let pending = subs.list_all(Some(SubmissionStatus::Pending)).await;
        assert!(pending.is_empty());

        f.client.session.logout();
        let approved = subs.list_approved(None).await;
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, paper.id);
        assert!(approved[0].updated_at.is_some());
        assert_eq!(subs.list_approved(Some(SubmissionType::Research)).await.len(), 1);
        assert!(subs.list_approved(Some(SubmissionType::Discussion)).await.is_empty());
    }

    #[tokio::test]
    async fn newest_first() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.login(NAMSOO);
        let mut ids = Vec::new();
        for (title, date) in [("a", "2025-10-01T00:00:00Z"), ("b", "2025-12-01T00:00:00Z"), ("c", "2025-11-01T00:00:00Z")] {
            let s = subs.submit("discussion", title, "content", "", None).await.unwrap();
            f.server
                .test_set_column(Table::Submissions, &s.id.to_string(), "created_at", json!(date));
            ids.push(s.id);
        }
        let mine = subs.list_mine().await;
        assert_eq!(mine.iter().map(|s| s.id).collect::<Vec<_>>(), vec![ids[1], ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn validation() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        let res = subs.submit("research", "Title", "Content", "", None).await;
        assert!(matches!(res, Err(Error::AuthRequired)));
        assert_eq!(*f.events.borrow(), vec![SessionEvent::LoginRequested]);

        f.login(JOSEPH);
        for (kind, title, content) in [("", "t", "c"), ("research", " ", "c"), ("research", "t", "\n")] {
            match subs.submit(kind, title, content, "", None).await {
                Err(Error::Validation(msg)) => assert_eq!(msg, MISSING_FIELDS),
                other => panic!("unexpected result {other:?}"),
            }
        }
        let res = subs.submit("keynote", "t", "c", "", None).await;
        assert!(matches!(res, Err(Error::Validation(_))));
        assert_eq!(f.server.test_num_rows(Table::Submissions), 0);
    }

    #[tokio::test]
    async fn attachments() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.login(JOSEPH);
        let s = subs.submit("essay", "Poster", "Body", "", Some(pdf())).await.unwrap();
        let path = s.attachment_path.clone().unwrap();
        assert!(path.starts_with(&format!("submissions/{}_", s.id)));
        assert!(path.ends_with(".pdf"));
        assert_eq!(s.attachment_name.as_deref(), Some("poster.pdf"));
        assert_eq!(s.attachment_url, Some(format!("{MOCK_STORAGE_URL}/{path}")));
        assert_eq!(
            f.server.test_object(&path),
            Some((String::from("application/pdf"), b"%PDF-1.7".to_vec()))
        );
        assert_eq!(subs.list_mine().await, vec![s.clone()]);

        assert!(subs.delete(s.id).await);
        assert!(f.server.test_objects().is_empty());
        assert!(subs.list_mine().await.is_empty());
    }

    #[tokio::test]
    async fn failed_upload_keeps_submission() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.server.set_uploads_failing(true);
        f.login(JOSEPH);
        let s = subs.submit("research", "Paper", "Body", "", Some(pdf())).await.unwrap();
        assert!(!s.has_attachment());
        let mine = subs.list_mine().await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, s.id);
        assert_eq!(mine[0].attachment_url, None);
        assert!(f.server.test_objects().is_empty());
    }

    #[tokio::test]
    async fn delete_permissions() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.login(JOSEPH);
        let a = subs.submit("discussion", "A", "Body", "", None).await.unwrap();
        let b = subs.submit("discussion", "B", "Body", "", None).await.unwrap();

        f.login(NAMSOO);
        assert!(!subs.delete(a.id).await);
        f.client.session.logout();
        assert!(!subs.delete(a.id).await);
        assert_eq!(f.server.test_num_rows(Table::Submissions), 2);

        f.login(JOSEPH);
        assert!(subs.delete(a.id).await);
        f.login(ADMIN);
        assert!(subs.delete(b.id).await);
        assert_eq!(f.server.test_num_rows(Table::Submissions), 0);
        assert!(!subs.delete(b.id).await);
    }

    #[tokio::test]
    async fn offline_fallback() {
        let f = Fixture::new();
        let subs = &f.client.submissions;
        f.server.set_offline(true);
        f.login(JOSEPH);
        let s = subs.submit("discussion", "Offline", "Body", "", Some(pdf())).await.unwrap();
        assert_eq!(s.status, SubmissionStatus::Pending);
        assert!(!s.has_attachment());
        assert!(f.storage.get_raw(crate::storage::SUBMISSIONS_KEY).is_some());
        assert_eq!(subs.list_mine().await, vec![s.clone()]);
        assert!(subs.list_approved(None).await.is_empty());

        f.login(ADMIN);
        assert!(subs.set_status(s.id, SubmissionStatus::Approved).await);
        assert!(!subs.set_status(SubmissionId::new(), SubmissionStatus::Approved).await);
        assert_eq!(subs.list_approved(Some(SubmissionType::Discussion)).await.len(), 1);
        assert_eq!(subs.list_all(Some(SubmissionStatus::Approved)).await.len(), 1);

        f.server.set_offline(false);
        assert!(subs.list_all(None).await.is_empty());
        assert!(subs.delete(s.id).await);
        f.server.set_offline(true);
        assert!(subs.list_all(None).await.is_empty());
    }
}
