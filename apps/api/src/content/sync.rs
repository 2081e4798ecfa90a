//! Content sync — propagates every persisted collection beyond local storage.
//!
//! Calls are fire-and-forget: backends spawn their own task and only log
//! failures, so a store never waits on (or learns about) the outcome.

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use redis::AsyncCommands;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::SyncBackend;

/// Redis channel carrying `{key, payload}` change messages.
pub const REDIS_CHANNEL: &str = "portfolio:content";

pub trait ContentSync: Send + Sync {
    fn sync_content(&self, key: &str, payload: &str);
    fn backend_name(&self) -> &'static str;
}

/// Builds the configured backend.
pub async fn build_content_sync(backend: &SyncBackend) -> anyhow::Result<Box<dyn ContentSync>> {
    let sync: Box<dyn ContentSync> = match backend {
        SyncBackend::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
        } => {
            let client = build_s3_client(endpoint, access_key_id, secret_access_key).await;
            Box::new(S3ContentSync::new(client, bucket.clone()))
        }
        SyncBackend::Redis { url } => {
            let client = redis::Client::open(url.as_str())?;
            Box::new(RedisContentSync::new(client))
        }
        SyncBackend::Disabled => Box::new(DisabledSync),
    };
    info!("Content sync backend: {}", sync.backend_name());
    Ok(sync)
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(
    endpoint: &str,
    access_key_id: &str,
    secret_access_key: &str,
) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "portfolio-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

// ────────────────────────────────────────────────────────────────────────────
// S3 (CDN origin)
// ────────────────────────────────────────────────────────────────────────────

pub struct S3ContentSync {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ContentSync {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

pub fn s3_object_key(storage_key: &str) -> String {
    format!("content/{storage_key}.json")
}

impl ContentSync for S3ContentSync {
    fn sync_content(&self, key: &str, payload: &str) {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let object_key = s3_object_key(key);
        let body = payload.as_bytes().to_vec();

        tokio::spawn(async move {
            let result = client
                .put_object()
                .bucket(&bucket)
                .key(&object_key)
                .body(ByteStream::from(body))
                .content_type("application/json")
                .send()
                .await;
            match result {
                Ok(_) => debug!("Synced s3://{bucket}/{object_key}"),
                Err(e) => warn!("S3 sync of {object_key} failed: {e}"),
            }
        });
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis pub/sub
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisContentSync {
    client: redis::Client,
}

impl RedisContentSync {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

pub fn redis_message(key: &str, payload: &str) -> String {
    json!({ "key": key, "payload": payload }).to_string()
}

impl ContentSync for RedisContentSync {
    fn sync_content(&self, key: &str, payload: &str) {
        let client = self.client.clone();
        let message = redis_message(key, payload);
        let key = key.to_string();

        tokio::spawn(async move {
            let result = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                conn.publish::<_, _, ()>(REDIS_CHANNEL, message).await?;
                Ok::<(), redis::RedisError>(())
            }
            .await;
            if let Err(e) = result {
                warn!("Redis sync of '{key}' failed: {e}");
            }
        });
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Disabled
// ────────────────────────────────────────────────────────────────────────────

pub struct DisabledSync;

impl ContentSync for DisabledSync {
    fn sync_content(&self, key: &str, _payload: &str) {
        debug!("Sync disabled; '{key}' kept local");
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

/// Captures sync calls synchronously so tests can assert on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSync {
    calls: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingSync {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ContentSync for RecordingSync {
    fn sync_content(&self, key: &str, payload: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((key.to_string(), payload.to_string()));
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
