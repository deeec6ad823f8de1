use crate::api::CommentId;

/// Failed login attempts, with the message shown next to the login form
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Email not registered. Contact organizers for access.")]
    UnknownEmail,

    #[error("Incorrect password.")]
    BadPassword,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Please log in first.")]
    AuthRequired,

    #[error("You are not allowed to do this.")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Comment {0} is not known locally")]
    UnknownComment(CommentId),

    /// The remote store failed and so did local storage
    #[error("Saving locally failed")]
    Storage(#[from] anyhow::Error),
}
