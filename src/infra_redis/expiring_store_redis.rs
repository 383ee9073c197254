use crate::domain_port::{ExpiringStore, StoreError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Redis-backed expiring store.
///
/// Every command runs under `call_timeout`. Connectivity failures (I/O, dropped or refused
/// connection, timeout) are retried once after `retry_backoff`; anything else is returned
/// as is.
pub struct RedisExpiringStore {
    conn: ConnectionManager,
    call_timeout: Duration,
    retry_backoff: Duration,
}

impl RedisExpiringStore {
    pub fn new(conn: ConnectionManager, call_timeout: Duration, retry_backoff: Duration) -> Self {
        RedisExpiringStore {
            conn,
            call_timeout,
            retry_backoff,
        }
    }

    pub async fn connect(
        dsn: &str,
        call_timeout: Duration,
        retry_backoff: Duration,
    ) -> RedisResult<Self> {
        let client = redis::Client::open(dsn)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self::new(conn, call_timeout, retry_backoff))
    }

    fn is_transient(e: &RedisError) -> bool {
        e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    }

    async fn call<T, F, Fut>(&self, op: &'static str, key: &str, f: F) -> Result<T, StoreError>
    where
        F: Fn(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let mut retried = false;
        loop {
            let failure = match tokio::time::timeout(self.call_timeout, f(self.conn.clone())).await
            {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if Self::is_transient(&e) => StoreError::Unavailable(e.to_string()),
                Ok(Err(e)) => return Err(StoreError::Unavailable(e.to_string())),
                Err(_) => StoreError::Timeout(self.call_timeout),
            };
            if retried {
                return Err(failure);
            }
            warn!(op, key, error = %failure, "redis call failed, retrying once");
            retried = true;
            tokio::time::sleep(self.retry_backoff).await;
        }
    }
}

#[async_trait::async_trait]
impl ExpiringStore for RedisExpiringStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return Err(StoreError::Unavailable(format!("zero ttl for {key}")));
        }
        self.call("pset_ex", key, |mut conn| async move {
            conn.pset_ex::<_, _, ()>(key, value, millis).await
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.call("get", key, |mut conn| async move {
            conn.get::<_, Option<String>>(key).await
        })
        .await
    }

    async fn get_del(&self, key: &str) -> Result<Option<String>, StoreError> {
        // GETDEL is a single command, so two racing callers cannot both read the value.
        self.call("get_del", key, |mut conn| async move {
            conn.get_del::<_, Option<String>>(key).await
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.call("del", key, |mut conn| async move {
            conn.del::<_, ()>(key).await
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.call("exists", key, |mut conn| async move {
            conn.exists::<_, bool>(key).await
        })
        .await
    }
}
