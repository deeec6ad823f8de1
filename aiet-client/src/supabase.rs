use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    api::{Error, ObjectStorage, Order, Query, RemoteStore, Table},
    ClientConfig,
};

lazy_static::lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

/// Hosted backend: PostgREST row API plus object storage
#[derive(Clone, Debug)]
pub struct SupabaseClient {
    url: String,
    anon_key: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(config: &ClientConfig) -> SupabaseClient {
        if config.supabase_anon_key.is_empty() {
            tracing::warn!("no anon key configured, the hosted backend will refuse every request");
        }
        SupabaseClient {
            url: String::from(config.supabase_url.trim_end_matches('/')),
            anon_key: config.supabase_anon_key.clone(),
            bucket: config.bucket.clone(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.url, table.name())
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, path)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        CLIENT
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

async fn check(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .bytes()
        .await
        .with_context(|| format!("reading body of {status} response"))?;
    Err(anyhow!(Error::parse(status, &body)))
}

#[async_trait(?Send)]
impl RemoteStore for SupabaseClient {
    async fn select(&self, table: Table, query: &Query, order: Order) -> anyhow::Result<Vec<Value>> {
        let resp = self
            .request(reqwest::Method::GET, self.table_url(table))
            .query(&[("select", String::from("*")), ("order", order.to_postgrest())])
            .query(&query.to_postgrest())
            .send()
            .await
            .with_context(|| format!("sending select on {table}"))?;
        let rows: Vec<Value> = check(resp)
            .await?
            .json()
            .await
            .with_context(|| format!("parsing rows of {table}"))?;
        tracing::debug!(%table, rows = rows.len(), "selected rows");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> anyhow::Result<Value> {
        let resp = self
            .request(reqwest::Method::POST, self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .with_context(|| format!("sending insert into {table}"))?;
        let rows: Vec<Value> = check(resp)
            .await?
            .json()
            .await
            .with_context(|| format!("parsing inserted row of {table}"))?;
        tracing::debug!(%table, "inserted row");
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("insert into {table} returned no row"))
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> anyhow::Result<()> {
        let resp = self
            .request(reqwest::Method::PATCH, self.table_url(table))
            .header("Prefer", "return=minimal")
            .query(&query.to_postgrest())
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("sending update of {table}"))?;
        check(resp).await?;
        tracing::debug!(%table, "updated rows");
        Ok(())
    }

    async fn delete(&self, table: Table, query: &Query) -> anyhow::Result<()> {
        let resp = self
            .request(reqwest::Method::DELETE, self.table_url(table))
            .query(&query.to_postgrest())
            .send()
            .await
            .with_context(|| format!("sending delete from {table}"))?;
        check(resp).await?;
        tracing::debug!(%table, "deleted rows");
        Ok(())
    }
}

#[async_trait(?Send)]
impl ObjectStorage for SupabaseClient {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        let resp = self
            .request(reqwest::Method::POST, self.object_url(path))
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("sending upload of {path}"))?;
        check(resp).await?;
        tracing::debug!(%path, "uploaded object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, self.bucket, path
        )
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        let resp = self
            .request(
                reqwest::Method::DELETE,
                format!("{}/storage/v1/object/{}", self.url, self.bucket),
            )
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await
            .with_context(|| format!("sending removal of {path}"))?;
        check(resp).await?;
        tracing::debug!(%path, "removed object");
        Ok(())
    }
}
