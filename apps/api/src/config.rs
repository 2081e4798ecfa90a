use anyhow::{bail, Context, Result};

/// Where persisted content is propagated after every successful write.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncBackend {
    /// Upload each collection to an S3 bucket fronted by the CDN.
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
    },
    /// Publish each collection on a Redis channel for other sessions.
    Redis { url: String },
    /// Local persistence only.
    Disabled,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means content lives in process memory only.
    pub database_url: Option<String>,
    pub owner_token: String,
    pub sync: SyncBackend,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok(),
            owner_token: parse_owner_token(require_env("OWNER_TOKEN")?)?,
            sync: sync_backend_from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn sync_backend_from_env() -> Result<SyncBackend> {
    let backend = std::env::var("SYNC_BACKEND").unwrap_or_else(|_| "none".to_string());
    parse_sync_backend(&backend, require_env)
}

/// Resolves `SYNC_BACKEND` into a backend, pulling only the variables that
/// backend needs through `lookup`.
fn parse_sync_backend<F>(name: &str, lookup: F) -> Result<SyncBackend>
where
    F: Fn(&str) -> Result<String>,
{
    match name.trim().to_ascii_lowercase().as_str() {
        "s3" => Ok(SyncBackend::S3 {
            bucket: lookup("S3_BUCKET")?,
            endpoint: lookup("S3_ENDPOINT")?,
            access_key_id: lookup("AWS_ACCESS_KEY_ID")?,
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY")?,
        }),
        "redis" => Ok(SyncBackend::Redis {
            url: lookup("REDIS_URL")?,
        }),
        "none" | "" => Ok(SyncBackend::Disabled),
        other => bail!("SYNC_BACKEND must be one of s3, redis, none (got '{other}')"),
    }
}

/// Trims the owner token and refuses a blank one.
fn parse_owner_token(raw: String) -> Result<String> {
    let token = raw.trim();
    if token.is_empty() {
        bail!("OWNER_TOKEN must not be empty");
    }
    Ok(token.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
