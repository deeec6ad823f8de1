use std::{fmt, str::FromStr};

use crate::{Error, Time, Uuid};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> SubmissionId {
        SubmissionId(Uuid::new_v4())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Essay,
    Research,
    Discussion,
}

impl SubmissionType {
    pub const ALL: [SubmissionType; 3] = [
        SubmissionType::Essay,
        SubmissionType::Research,
        SubmissionType::Discussion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Essay => "essay",
            SubmissionType::Research => "research",
            SubmissionType::Discussion => "discussion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SubmissionType::Essay => "Essay",
            SubmissionType::Research => "Research Note",
            SubmissionType::Discussion => "Discussion",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            SubmissionType::Essay => "type-essay",
            SubmissionType::Research => "type-research",
            SubmissionType::Discussion => "type-discussion",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<SubmissionType, Error> {
        match s.trim() {
            "essay" => Ok(SubmissionType::Essay),
            "research" => Ok(SubmissionType::Research),
            "discussion" => Ok(SubmissionType::Discussion),
            other => Err(Error::InvalidRequest(format!(
                "unknown submission type {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 3] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "status-pending",
            SubmissionStatus::Approved => "status-approved",
            SubmissionStatus::Rejected => "status-rejected",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<SubmissionStatus, Error> {
        match s.trim() {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(Error::InvalidRequest(format!(
                "unknown submission status {other:?}"
            ))),
        }
    }
}

/// One row of the remote submissions table
///
/// The same layout is used for the local fallback record.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    #[serde(rename = "type")]
    pub kind: SubmissionType,
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_affiliation: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub attachment_name: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub attachment_path: Option<String>,
    pub created_at: Time,
    #[serde(default)]
    pub updated_at: Option<Time>,
}

impl Submission {
    pub fn has_attachment(&self) -> bool {
        self.attachment_path.is_some()
    }

    /// Tags are stored as one free-text field, this splits it on commas
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewSubmission {
    #[serde(rename = "type")]
    pub kind: SubmissionType,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub author_name: String,
    pub author_email: String,
    pub author_affiliation: String,
    pub status: SubmissionStatus,
}

impl NewSubmission {
    /// Materialize this submission without the remote store's help
    pub fn into_local(self, id: SubmissionId, now: Time) -> Submission {
        Submission {
            id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            tags: Some(self.tags),
            author_name: self.author_name,
            author_email: self.author_email,
            author_affiliation: Some(self.author_affiliation),
            status: self.status,
            attachment_name: None,
            attachment_url: None,
            attachment_path: None,
            created_at: now,
            updated_at: Some(now),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StatusPatch {
    pub status: SubmissionStatus,
    pub updated_at: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AttachmentPatch {
    pub attachment_name: String,
    pub attachment_url: String,
    pub attachment_path: String,
}

impl From<StoredAttachment> for AttachmentPatch {
    fn from(a: StoredAttachment) -> AttachmentPatch {
        AttachmentPatch {
            attachment_name: a.name,
            attachment_url: a.url,
            attachment_path: a.path,
        }
    }
}

/// A file picked by the user, not uploaded yet
#[derive(Clone, Eq, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Extension of the original file name, if it has one
    pub fn extension(&self) -> Option<&str> {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredAttachment {
    pub name: String,
    pub path: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_types_and_statuses() {
        assert_eq!(
            "research".parse::<SubmissionType>().unwrap(),
            SubmissionType::Research
        );
        assert!("".parse::<SubmissionType>().is_err());
        assert!("poem".parse::<SubmissionType>().is_err());
        assert_eq!(
            " approved ".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Approved
        );
        assert!("done".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn row_layout() {
        let s: Submission = serde_json::from_value(serde_json::json!({
            "id": "3f1e1c1e-59a7-4d8e-9d1e-0c0c0c0c0c02",
            "type": "essay",
            "title": "On inquiry",
            "content": "...",
            "tags": "ai, assessment,, ",
            "author_name": "Alice Liddell",
            "author_email": "alice@example.edu",
            "author_affiliation": null,
            "status": "pending",
            "attachment_name": null,
            "attachment_url": null,
            "attachment_path": null,
            "created_at": "2025-12-16T08:30:00Z",
            "updated_at": "2025-12-16T08:30:00Z",
        }))
        .expect("parsing submission row");
        assert_eq!(s.kind, SubmissionType::Essay);
        assert_eq!(s.status, SubmissionStatus::Pending);
        assert!(!s.has_attachment());
        assert_eq!(s.tag_list(), vec!["ai", "assessment"]);
    }

    #[test]
    fn attachment_extension() {
        let a = |name: &str| Attachment {
            name: String::from(name),
            content_type: String::from("application/pdf"),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(a("paper.final.pdf").extension(), Some("pdf"));
        assert_eq!(a("README").extension(), None);
        assert_eq!(a(".hidden").extension(), None);
        assert_eq!(a("trailing.").extension(), None);
    }
}
