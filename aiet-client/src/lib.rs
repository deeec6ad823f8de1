use std::rc::Rc;

mod comments;
pub use comments::CommentRepository;

mod config;
pub use config::ClientConfig;

mod directory;
pub use directory::Directory;

pub mod display;

mod error;
pub use error::{AuthError, Error};

pub mod fallback;

#[cfg(test)]
mod fixture;

mod session;
pub use session::{SessionEvent, SessionStore};

pub mod storage;
pub use storage::MemoryStorage;

mod submissions;
pub use submissions::{attachment_path, SubmissionRepository, MISSING_FIELDS};

mod supabase;
pub use supabase::SupabaseClient;

pub mod api {
    pub use aiet_api::*;
}

use api::{KeyValueStore, ObjectStorage, RemoteStore};

/// Everything a page needs, sharing one session and one backend
pub struct Client<R, S> {
    pub session: Rc<SessionStore<S>>,
    pub comments: CommentRepository<R, S>,
    pub submissions: SubmissionRepository<R, R, S>,
}

impl<R, S> Client<R, S>
where
    R: RemoteStore + ObjectStorage,
    S: KeyValueStore + Clone,
{
    pub fn new(backend: Rc<R>, storage: S, directory: Directory, config: &ClientConfig) -> Client<R, S> {
        let session = Rc::new(SessionStore::new(storage.clone(), directory, config));
        Client {
            comments: CommentRepository::new(backend.clone(), storage.clone(), session.clone()),
            submissions: SubmissionRepository::new(backend.clone(), backend, storage, session.clone()),
            session,
        }
    }
}
