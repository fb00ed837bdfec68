//! Configuration module
//!
//! Environment-variable driven configuration for the API server and the
//! ingest pipeline. `DATABASE_URL`, `JWT_SECRET` and `S3_BUCKET` are
//! required; everything else has a sensible default.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 1024 * 1024 * 1024; // 1 GiB
const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// How the pipeline publishes an uploaded object back into the video record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlAccess {
    /// Store the bucket's public object URL.
    Public,
    /// Store a time-limited presigned GET URL.
    Presigned,
}

impl FromStr for UrlAccess {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" => Ok(UrlAccess::Public),
            "presigned" => Ok(UrlAccess::Presigned),
            other => Err(anyhow!(
                "Invalid URL_ACCESS '{}': expected 'public' or 'presigned'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    // Storage configuration
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    // Ingest pipeline configuration
    pub assets_root: PathBuf,
    pub max_video_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub remux_enabled: bool,
    pub url_access: UrlAccess,
    pub presign_ttl_secs: u64,
    pub environment: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let s3_bucket = env::var("S3_BUCKET").context("S3_BUCKET must be set")?;

        let s3_region = env::var("S3_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .unwrap_or_else(|_| "us-east-1".to_string());

        let assets_root = env::var("ASSETS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("clipvault"));

        let video_allowed_content_types = env::var("VIDEO_ALLOWED_CONTENT_TYPES")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["video/mp4".to_string()]);

        let url_access = env_or("URL_ACCESS", "public").parse::<UrlAccess>()?;

        Ok(Config {
            server_port: env_parse("PORT", DEFAULT_SERVER_PORT)?,
            database_url,
            jwt_secret,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
            s3_bucket,
            s3_region,
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            assets_root,
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES)?,
            video_allowed_content_types,
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            remux_enabled: env_parse("REMUX_ENABLED", true)?,
            url_access,
            presign_ttl_secs: env_parse("PRESIGN_TTL_SECS", DEFAULT_PRESIGN_TTL_SECS)?,
            environment: env_or("ENVIRONMENT", "development"),
        })
    }
}
