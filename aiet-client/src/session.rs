use std::{cell::RefCell, rc::Rc};

use chrono::{Duration, Utc};

use crate::{
    api::{same_email, KeyValueStore, Session, SessionUser},
    storage::SESSION_KEY,
    AuthError, ClientConfig, Directory,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    LoggedIn(SessionUser),
    LoggedOut,
    /// The persisted session reached its expiry and was dropped
    Expired,
    /// Something needs an authenticated user, and the login prompt should open
    LoginRequested,
}

type Listener = Rc<dyn Fn(&SessionEvent)>;

/// The current member session, persisted across reloads
pub struct SessionStore<S> {
    storage: S,
    directory: Directory,
    shared_password: String,
    admin_email: String,
    duration: Duration,
    session: RefCell<Option<Session>>,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Restore the persisted session, if there is a readable one
    pub fn new(storage: S, directory: Directory, config: &ClientConfig) -> SessionStore<S> {
        let session = match storage.get::<Session>(SESSION_KEY) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(?err, "discarding unreadable persisted session");
                storage.delete(SESSION_KEY);
                None
            }
        };
        SessionStore {
            storage,
            directory,
            shared_password: config.shared_password.clone(),
            admin_email: config.admin_email.clone(),
            duration: config.session_duration(),
            session: RefCell::new(session),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let member = self.directory.find(email).ok_or(AuthError::UnknownEmail)?;
        if password != self.shared_password {
            return Err(AuthError::BadPassword);
        }
        let now = Utc::now();
        let session = Session {
            user: SessionUser::new(member, now),
            expires_at: now
                .checked_add_signed(self.duration)
                .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC),
        };
        if let Err(err) = self.storage.set(SESSION_KEY, &session) {
            tracing::error!(?err, "failed persisting session, it will not survive a reload");
        }
        let user = session.user.clone();
        *self.session.borrow_mut() = Some(session);
        tracing::info!(email = %user.email, "member logged in");
        self.notify(&SessionEvent::LoggedIn(user.clone()));
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.borrow_mut().take();
        self.storage.delete(SESSION_KEY);
        tracing::info!("member logged out");
        self.notify(&SessionEvent::LoggedOut);
    }

    /// The logged-in member, or None if there is none or their session expired
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session().map(|s| s.user)
    }

    pub fn session(&self) -> Option<Session> {
        if let Some(s) = &*self.session.borrow() {
            if s.is_valid_at(Utc::now()) {
                return Some(s.clone());
            }
        } else {
            return None;
        }
        self.expire();
        None
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user()
            .map_or(false, |u| same_email(&u.email, &self.admin_email))
    }

    /// Ask the login prompt to open
    pub fn request_login(&self) {
        self.notify(&SessionEvent::LoginRequested);
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn expire(&self) {
        self.session.borrow_mut().take();
        self.storage.delete(SESSION_KEY);
        tracing::info!("session expired");
        self.notify(&SessionEvent::Expired);
    }

    fn notify(&self, event: &SessionEvent) {
        // listeners may call back into the store, or subscribe new listeners
        let listeners = self.listeners.borrow().clone();
        for l in listeners {
            l(event);
        }
    }
}
