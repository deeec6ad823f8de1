use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::api::{KeyValueStore, PostId};

pub const SESSION_KEY: &str = "aiet_session";
pub const SUBMISSIONS_KEY: &str = "aiet_submissions";

pub fn comments_key(post: &PostId) -> String {
    format!("aiet_comments_{post}")
}

/// Volatile storage, shared between its clones
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(Rc<RefCell<HashMap<String, String>>>);

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut res = self.0.borrow().keys().cloned().collect::<Vec<_>>();
        res.sort();
        res
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.0.borrow_mut().insert(String::from(key), value);
        Ok(())
    }

    fn delete(&self, key: &str) {
        self.0.borrow_mut().remove(key);
    }
}
