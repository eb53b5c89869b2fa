//! Redis-backed view count store.

use crate::domain::entities::{Slug, ViewCount};
use crate::domain::repositories::{StoreError, StoreResult, ViewRepository};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, Script, aio::ConnectionManager};
use tracing::{debug, info};

/// Reads the stored value with the same tolerant parsing as
/// [`ViewCount::parse_stored`], adds one and writes it back in a single
/// server-side step.
///
/// Lua numbers are doubles, so the count is incremented as a decimal string.
/// Values above `u64::MAX` read as 0 and `u64::MAX` itself saturates. The new
/// value is returned as a string.
const INCREMENT_SCRIPT: &str = r#"
local max = '18446744073709551615'
local current = redis.call('GET', KEYS[1])
local digits = current and string.match(current, '^%s*%+?(%d+)') or '0'
digits = (string.gsub(digits, '^0+', ''))
if #digits > #max or (#digits == #max and digits > max) then
  digits = ''
end
if digits == '' then
  digits = '1'
elseif digits ~= max then
  local head, nines = string.match(digits, '^(.-)(9*)$')
  if head == '' then
    digits = '1' .. string.rep('0', #nines)
  else
    local last = tonumber(string.sub(head, -1)) + 1
    digits = string.sub(head, 1, -2) .. tostring(last) .. string.rep('0', #nines)
  end
end
redis.call('SET', KEYS[1], digits)
return digits
"#;

/// Redis store keeping one string value per slug under a key prefix.
///
/// Uses `ConnectionManager` for automatic reconnection. Unlike the GET then
/// SET sequence a plain key-value API forces, increments run as a Lua script,
/// so two concurrent views of the same slug always add two.
pub struct RedisViewRepository {
    conn: ConnectionManager,
    key_prefix: String,
    increment_script: Script,
}

impl RedisViewRepository {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `key_prefix` - namespace prepended to every slug (e.g., `"views:"`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> StoreResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            conn: manager,
            key_prefix: key_prefix.into(),
            increment_script: Script::new(INCREMENT_SCRIPT),
        })
    }

    fn build_key(&self, slug: &Slug) -> String {
        format!("{}{}", self.key_prefix, slug)
    }

    /// Collects every key under the prefix with cursor-based SCAN.
    async fn scan_keys(&self) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(&self.key_prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(op_error)?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

#[async_trait]
impl ViewRepository for RedisViewRepository {
    async fn get_count(&self, slug: &Slug) -> StoreResult<ViewCount> {
        let key = self.build_key(slug);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn.get(&key).await.map_err(op_error)?;
        debug!(key = %key, hit = raw.is_some(), "Redis GET");

        Ok(raw
            .as_deref()
            .map(ViewCount::parse_stored)
            .unwrap_or_default())
    }

    async fn increment(&self, slug: &Slug) -> StoreResult<ViewCount> {
        let key = self.build_key(slug);
        let mut conn = self.conn.clone();

        let stored: String = self
            .increment_script
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(op_error)?;

        Ok(ViewCount::parse_stored(&stored))
    }

    async fn set_count(&self, slug: &Slug, count: ViewCount) -> StoreResult<()> {
        let key = self.build_key(slug);
        let mut conn = self.conn.clone();

        conn.set::<_, _, ()>(&key, count.to_stored())
            .await
            .map_err(op_error)
    }

    async fn delete(&self, slug: &Slug) -> StoreResult<bool> {
        let key = self.build_key(slug);
        let mut conn = self.conn.clone();

        let deleted: i64 = conn.del(&key).await.map_err(op_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>> {
        let mut keys = self.scan_keys().await?;
        keys.sort();
        keys.dedup();

        let mut conn = self.conn.clone();
        let mut out = Vec::with_capacity(keys.len());

        for key in keys {
            let raw: Option<String> = conn.get(&key).await.map_err(op_error)?;
            if let Some(raw) = raw {
                let slug = key.strip_prefix(&self.key_prefix).unwrap_or(&key).to_string();
                out.push((slug, ViewCount::parse_stored(&raw)));
            }
        }

        Ok(out)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}

fn op_error(e: RedisError) -> StoreError {
    if e.is_connection_refusal() {
        StoreError::Unavailable(e.to_string())
    } else if e.is_io_error() || e.is_connection_dropped() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Operation(e.to_string())
    }
}

/// Escapes glob metacharacters so the prefix matches literally in SCAN MATCH.
fn escape_glob(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
