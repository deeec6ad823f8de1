use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentId, CommentRow, NewCommentRow, PostId, Reply};

mod error;
pub use error::Error;

mod member;
pub use member::{Author, Member, Role};

mod query;
pub use query::{Order, OrderType, Query, Table};

mod session;
pub use session::{Session, SessionUser};

mod store;
pub use store::{KeyValueStore, ObjectStorage, RemoteStore};

mod submission;
pub use submission::{
    Attachment, AttachmentPatch, NewSubmission, StatusPatch, StoredAttachment, Submission,
    SubmissionId, SubmissionStatus, SubmissionType,
};

/// Emails are compared trimmed and case-insensitively everywhere
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_comparison() {
        assert!(same_email("alice@example.edu", "ALICE@Example.edu"));
        assert!(same_email("  alice@example.edu ", "alice@example.edu"));
        assert!(!same_email("alice@example.edu", "bob@example.edu"));
        assert!(!same_email("alice@example.edu", "alice@example.ed"));
    }
}
