use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use aiet_client::api::KeyValueStore;
use anyhow::Context;

const STORE_FILE: &str = "store.json";

/// Key-value store kept in one JSON file, rewritten on every change
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: &Path) -> anyhow::Result<FileStorage> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
        Ok(FileStorage {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temporary file in {}", self.dir.display()))?;
        serde_json::to_writer_pretty(&mut file, entries).context("serializing store")?;
        file.flush().context("flushing store")?;
        file.persist(self.path())
            .with_context(|| format!("replacing {}", self.path().display()))?;
        Ok(())
    }

    fn load_or_reset(&self) -> BTreeMap<String, String> {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(?err, "local store is unreadable, starting from an empty one");
            BTreeMap::new()
        })
    }
}

impl KeyValueStore for FileStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.load_or_reset().remove(key)
    }

    fn set_raw(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut entries = self.load_or_reset();
        entries.insert(String::from(key), value);
        self.save(&entries)
    }

    fn delete(&self, key: &str) {
        let mut entries = self.load_or_reset();
        if entries.remove(key).is_some() {
            if let Err(err) = self.save(&entries) {
                tracing::error!(?err, key, "failed deleting local store entry");
            }
        }
    }
}
