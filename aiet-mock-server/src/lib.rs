use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use aiet_api::{Error, ObjectStorage, Order, Query, RemoteStore, Table, Uuid};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

pub const MOCK_STORAGE_URL: &str = "https://mock.invalid/storage/v1/object/public/aiet-attachments";

/// In-memory stand-in for the hosted backend, with switchable failures
pub struct MockServer(RefCell<State>);

#[derive(Default)]
struct State {
    tables: HashMap<Table, Vec<Value>>,
    objects: BTreeMap<String, StoredObject>,
    offline: bool,
    uploads_failing: bool,
}

#[derive(Debug)]
struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(RefCell::new(State::default()))
    }

    /// While offline, every row and storage call fails
    pub fn set_offline(&self, offline: bool) {
        self.0.borrow_mut().offline = offline;
    }

    pub fn set_uploads_failing(&self, failing: bool) {
        self.0.borrow_mut().uploads_failing = failing;
    }

    /// Return all rows of `table`, in insertion order
    pub fn test_rows(&self, table: Table) -> Vec<Value> {
        self.0
            .borrow()
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn test_num_rows(&self, table: Table) -> usize {
        self.0.borrow().tables.get(&table).map_or(0, |t| t.len())
    }

    /// Overwrite one column of the row with the given id, bypassing any check
    pub fn test_set_column(&self, table: Table, id: &str, column: &str, value: Value) {
        let mut state = self.0.borrow_mut();
        let row = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
            .unwrap_or_else(|| panic!("no row {id} in {table}"));
        row[column] = value;
    }

    /// Return the stored object paths
    pub fn test_objects(&self) -> Vec<String> {
        self.0.borrow().objects.keys().cloned().collect()
    }

    pub fn test_object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.0
            .borrow()
            .objects
            .get(path)
            .map(|o| (o.content_type.clone(), o.bytes.clone()))
    }

    fn check_online(&self) -> anyhow::Result<()> {
        match self.0.borrow().offline {
            true => Err(anyhow!(Error::Unknown(String::from(
                "mock server is offline"
            )))),
            false => Ok(()),
        }
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

fn fill_defaults(table: Table, row: &mut Map<String, Value>) {
    let now = Value::String(Utc::now().to_rfc3339());
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert_with(|| now.clone());
    match table {
        Table::Comments => {
            row.entry("parent_id").or_insert(Value::Null);
        }
        Table::Submissions => {
            row.entry("updated_at").or_insert(now);
            for col in ["attachment_name", "attachment_url", "attachment_path"] {
                row.entry(col).or_insert(Value::Null);
            }
        }
    }
}

#[async_trait(?Send)]
impl RemoteStore for MockServer {
    async fn select(&self, table: Table, query: &Query, order: Order) -> anyhow::Result<Vec<Value>> {
        self.check_online()?;
        let mut rows: Vec<Value> = self
            .0
            .borrow()
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        order.sort(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> anyhow::Result<Value> {
        self.check_online()?;
        let mut row = match row {
            Value::Object(row) => row,
            other => {
                return Err(anyhow!(Error::InvalidRequest(format!(
                    "inserted row is not an object: {other}"
                ))))
            }
        };
        fill_defaults(table, &mut row);
        let row = Value::Object(row);
        self.0
            .borrow_mut()
            .tables
            .entry(table)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> anyhow::Result<()> {
        self.check_online()?;
        let patch = match patch {
            Value::Object(patch) => patch,
            other => {
                return Err(anyhow!(Error::InvalidRequest(format!(
                    "patch is not an object: {other}"
                ))))
            }
        };
        let mut state = self.0.borrow_mut();
        for row in state.tables.entry(table).or_default().iter_mut() {
            if !query.matches(row) {
                continue;
            }
            if let Value::Object(row) = row {
                for (k, v) in patch.iter() {
                    row.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, query: &Query) -> anyhow::Result<()> {
        self.check_online()?;
        self.0
            .borrow_mut()
            .tables
            .entry(table)
            .or_default()
            .retain(|r| !query.matches(r));
        Ok(())
    }
}

#[async_trait(?Send)]
impl ObjectStorage for MockServer {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        self.check_online()?;
        let mut state = self.0.borrow_mut();
        if state.uploads_failing {
            return Err(anyhow!(Error::Unknown(String::from(
                "mock upload failure"
            ))));
        }
        if state.objects.contains_key(path) {
            return Err(anyhow!(Error::Conflict(format!(
                "object {path} already exists"
            ))));
        }
        state.objects.insert(
            String::from(path),
            StoredObject {
                content_type: String::from(content_type),
                bytes,
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{MOCK_STORAGE_URL}/{path}")
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        self.check_online()?;
        self.0.borrow_mut().objects.remove(path);
        Ok(())
    }
}
