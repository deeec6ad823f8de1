use std::{cell::RefCell, rc::Rc};

use aiet_mock_server::MockServer;

use crate::{
    api::SessionUser, Client, ClientConfig, Directory, MemoryStorage, SessionEvent,
};

pub const JOSEPH: &str = "krajcik@msu.edu";
pub const NAMSOO: &str = "namsoo@msu.edu";
pub const ADMIN: &str = "ahn@anarchy.io";

pub struct Fixture {
    pub server: Rc<MockServer>,
    pub storage: MemoryStorage,
    pub client: Client<MockServer, MemoryStorage>,
    pub events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture::with_directory(Rc::new(MockServer::new()), Directory::conference())
    }

    /// A second page load against the same backend, with its own local storage
    pub fn with_directory(server: Rc<MockServer>, directory: Directory) -> Fixture {
        let storage = MemoryStorage::new();
        let client = Client::new(server.clone(), storage.clone(), directory, &ClientConfig::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        client.session.subscribe({
            let events = events.clone();
            move |e| events.borrow_mut().push(e.clone())
        });
        Fixture {
            server,
            storage,
            client,
            events,
        }
    }

    pub fn login(&self, email: &str) -> SessionUser {
        self.client.session.login(email, "stem2025").unwrap()
    }
}
