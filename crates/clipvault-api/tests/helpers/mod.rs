//! Test doubles for the ingest pipeline: canned prober/transcoder results,
//! an in-memory object store and an in-memory video repository.

// Shared between test binaries; not every binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use clipvault_api::auth::issue_token;
use clipvault_api::services::ingest::IngestPipeline;
use clipvault_api::setup::routes::build_router;
use clipvault_api::state::AppState;
use clipvault_core::models::{NewVideo, Video};
use clipvault_core::{AppError, Config, UrlAccess};
use clipvault_db::VideoRepository;
use clipvault_processing::{
    classify_dimensions, processed_output_path, ProbeError, ProbeResult, Prober, TranscodeError,
    Transcoder,
};
use clipvault_storage::{Storage, StorageError, StorageResult};

pub fn probe_result(width: u32, height: u32) -> ProbeResult {
    let (orientation, ratio) = classify_dimensions(width, height);
    ProbeResult {
        width,
        height,
        orientation,
        ratio,
    }
}

pub struct StaticProber(pub ProbeResult);

#[async_trait]
impl Prober for StaticProber {
    async fn probe(&self, _path: &Path) -> Result<ProbeResult, ProbeError> {
        Ok(self.0.clone())
    }
}

pub struct FailingProber;

#[async_trait]
impl Prober for FailingProber {
    async fn probe(&self, _path: &Path) -> Result<ProbeResult, ProbeError> {
        Err(ProbeError::ProcessFailed {
            stderr: "moov atom not found".to_string(),
        })
    }
}

/// Copies the input to the derived output path, like a remux that changed
/// nothing but the container layout.
pub struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        let output = processed_output_path(input);
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

pub struct FailingTranscoder;

#[async_trait]
impl Transcoder for FailingTranscoder {
    async fn remux_fast_start(&self, _input: &Path) -> Result<PathBuf, TranscodeError> {
        Err(TranscodeError::ProcessFailed {
            stderr: "could not write output file".to_string(),
        })
    }
}

/// Writes a partial output file and then fails, like ffmpeg dying
/// mid-remux.
pub struct InterruptedTranscoder;

#[async_trait]
impl Transcoder for InterruptedTranscoder {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        tokio::fs::write(processed_output_path(input), b"partial moov").await?;
        Err(TranscodeError::ProcessFailed {
            stderr: "muxer reported an error while finalizing".to_string(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub fn object_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|(b, _)| b.clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let data = tokio::fs::read(local_path).await?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        Ok(format!(
            "https://signed.clipvault.test/{}?expires={}",
            key,
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://clips.s3.us-east-1.amazonaws.com/{}", key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::DeleteFailed(format!("no such key {}", key))),
        }
    }
}

#[derive(Default)]
pub struct MemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
}

impl MemoryVideoRepository {
    pub fn seed(&self, user_id: Uuid) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: "test video".to_string(),
            description: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().insert(video.id, video.clone());
        video
    }

    pub fn stored(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn fail_next_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for MemoryVideoRepository {
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        let now = Utc::now();
        let video = Video {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().insert(video.id, video.clone());
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.lock().unwrap().get(&id).cloned())
    }

    async fn update_video_url(&self, id: Uuid, video_url: &str) -> Result<(), AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection reset".to_string()));
        }

        let mut videos = self.videos.lock().unwrap();
        let video = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        video.video_url = Some(video_url.to_string());
        video.updated_at = Utc::now();
        Ok(())
    }
}

pub fn test_config(assets_root: PathBuf) -> Config {
    Config {
        server_port: 0,
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiry_hours: 1,
        s3_bucket: "clips".to_string(),
        s3_region: "us-east-1".to_string(),
        s3_endpoint: None,
        assets_root,
        max_video_size_bytes: 64 * 1024 * 1024,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        remux_enabled: true,
        url_access: UrlAccess::Public,
        presign_ttl_secs: 3600,
        environment: "test".to_string(),
    }
}

pub struct TestHarness {
    pub dir: TempDir,
    pub repo: Arc<MemoryVideoRepository>,
    pub storage: Arc<MemoryStorage>,
    pub pipeline: IngestPipeline,
}

impl TestHarness {
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path()).unwrap().count()
    }
}

pub fn harness(
    mutate_config: impl FnOnce(&mut Config),
    prober: Arc<dyn Prober>,
    transcoder: Arc<dyn Transcoder>,
) -> TestHarness {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path().to_path_buf());
    mutate_config(&mut config);

    let repo = Arc::new(MemoryVideoRepository::default());
    let storage = Arc::new(MemoryStorage::default());
    let pipeline = IngestPipeline::new(
        config,
        repo.clone(),
        storage.clone(),
        prober,
        transcoder,
    );

    TestHarness {
        dir,
        repo,
        storage,
        pipeline,
    }
}

pub fn default_harness() -> TestHarness {
    harness(
        |_| {},
        Arc::new(StaticProber(probe_result(1280, 720))),
        Arc::new(CopyTranscoder),
    )
}

pub fn payload() -> Bytes {
    Bytes::from_static(b"ftyp-fake-mp4-payload")
}

/// Harness for driving the router end to end, with the same fakes behind
/// the real handlers, auth and layers.
pub struct ApiHarness {
    pub dir: TempDir,
    pub repo: Arc<MemoryVideoRepository>,
    pub storage: Arc<MemoryStorage>,
    pub router: Router,
    jwt_secret: String,
}

impl ApiHarness {
    pub fn bearer(&self, user_id: Uuid) -> String {
        let token = issue_token(user_id, &self.jwt_secret, 1).unwrap();
        format!("Bearer {}", token)
    }
}

pub fn api_harness() -> ApiHarness {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_path_buf());
    let jwt_secret = config.jwt_secret.clone();

    let repo = Arc::new(MemoryVideoRepository::default());
    let storage = Arc::new(MemoryStorage::default());
    let pipeline = IngestPipeline::new(
        config.clone(),
        repo.clone(),
        storage.clone(),
        Arc::new(StaticProber(probe_result(1280, 720))),
        Arc::new(CopyTranscoder),
    );

    let state = Arc::new(AppState {
        config,
        videos: repo.clone(),
        ingest: pipeline,
    });
    let router = build_router(state);

    ApiHarness {
        dir,
        repo,
        storage,
        router,
        jwt_secret,
    }
}

pub const MULTIPART_BOUNDARY: &str = "clipvault-test-boundary";

/// Encode a single-field `multipart/form-data` body.
pub fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.mp4\"\r\n\
             Content-Type: {}\r\n\r\n",
            field, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
