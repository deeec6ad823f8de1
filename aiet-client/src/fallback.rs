use std::future::Future;

/// Run `remote`, and fall back to `local` if it fails
///
/// The remote error is only logged: callers see the local result as if it
/// had been the remote one.
pub async fn remote_or_local<T, Fut>(what: &str, remote: Fut, local: impl FnOnce() -> T) -> T
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match remote.await {
        Ok(res) => res,
        Err(err) => {
            tracing::warn!(?err, "{what}: remote store failed, using local storage");
            local()
        }
    }
}

/// Same as `remote_or_local`, for local operations that can fail too
pub async fn remote_or_try_local<T, E, Fut>(
    what: &str,
    remote: Fut,
    local: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    remote_or_local(what, async { remote.await.map(Ok) }, local).await
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[tokio::test]
    async fn remote_wins_when_it_works() {
        let res = remote_or_local("test", async { Ok(1) }, || 2).await;
        assert_eq!(res, 1);
    }

    #[tokio::test]
    async fn local_on_failure() {
        let res = remote_or_local("test", async { Err(anyhow!("down")) }, || 2).await;
        assert_eq!(res, 2);
        let res: Result<u32, &str> =
            remote_or_try_local("test", async { Err(anyhow!("down")) }, || Err("full")).await;
        assert_eq!(res, Err("full"));
    }
}
