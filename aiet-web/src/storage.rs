use aiet_client::api::KeyValueStore;
use anyhow::anyhow;
use gloo_storage::{LocalStorage, Storage};

/// The browser's localStorage
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(?err, key, "failed reading from localStorage");
                None
            }
        }
    }

    fn set_raw(&self, key: &str, value: String) -> anyhow::Result<()> {
        LocalStorage::raw()
            .set_item(key, &value)
            .map_err(|err| anyhow!("failed writing {key:?} to localStorage: {err:?}"))
    }

    fn delete(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
