//! Video ingest orchestration: validate → stage → probe → [remux] → upload
//! → update metadata → clean up.
//!
//! The sequence is strictly linear. Every failure path removes the temp
//! files created so far before propagating; the metadata update always
//! precedes temp cleanup on the committed path, and cleanup failures are
//! logged rather than surfaced.

use bytes::Bytes;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use uuid::Uuid;

use clipvault_core::models::Video;
use clipvault_core::{AppError, Config, UrlAccess};
use clipvault_db::VideoRepository;
use clipvault_processing::{processed_output_path, Prober, Transcoder};
use clipvault_storage::Storage;

pub struct IngestPipeline {
    config: Config,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn Prober>,
    transcoder: Arc<dyn Transcoder>,
    // Per-video serialization: concurrent ingests for the same id would
    // otherwise race on the staged file, the remote object and the record.
    // Entries are weak so the map only tracks in-flight ingests.
    locks: Mutex<HashMap<Uuid, Weak<tokio::sync::Mutex<()>>>>,
}

impl IngestPipeline {
    pub fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn Prober>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            config,
            videos,
            storage,
            prober,
            transcoder,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, video_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| lock.strong_count() > 0);
        match locks.get(&video_id).and_then(Weak::upgrade) {
            Some(lock) => lock,
            None => {
                let lock = Arc::new(tokio::sync::Mutex::new(()));
                locks.insert(video_id, Arc::downgrade(&lock));
                lock
            }
        }
    }

    /// Number of ingests currently holding or awaiting a per-video lock.
    pub fn active_locks(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| lock.strong_count() > 0);
        locks.len()
    }

    /// Run the full ingest sequence for one upload request.
    ///
    /// Validation order: record exists → caller owns it → content type is
    /// accepted → payload fits the ceiling. Oversized payloads are rejected
    /// before any temp file is created.
    pub async fn ingest_video(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        content_type: &str,
        data: Bytes,
    ) -> Result<Video, AppError> {
        let lock = self.lock_for(video_id);
        let _guard = lock.lock().await;

        let video = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if video.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to upload this video".to_string(),
            ));
        }

        if !self
            .config
            .video_allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type)
        {
            return Err(AppError::InvalidInput(format!(
                "Unsupported content type '{}': expected {}",
                content_type,
                self.config.video_allowed_content_types.join(", ")
            )));
        }

        if data.len() > self.config.max_video_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Payload of {} bytes exceeds the {} byte limit",
                data.len(),
                self.config.max_video_size_bytes
            )));
        }

        let mut temp_files: Vec<PathBuf> = Vec::new();
        let result = self
            .stage_and_run(&video, content_type, data, &mut temp_files)
            .await;

        // Best-effort on both success and failure; the record update has
        // already committed by the time this runs on the success path.
        cleanup_temp_files(&temp_files).await;

        result
    }

    async fn stage_and_run(
        &self,
        video: &Video,
        content_type: &str,
        data: Bytes,
        temp_files: &mut Vec<PathBuf>,
    ) -> Result<Video, AppError> {
        tokio::fs::create_dir_all(&self.config.assets_root).await?;

        let staged = self.config.assets_root.join(format!("{}.mp4", video.id));
        temp_files.push(staged.clone());
        tokio::fs::write(&staged, &data).await?;

        tracing::info!(
            video_id = %video.id,
            size_bytes = data.len(),
            path = %staged.display(),
            "Upload staged"
        );

        let probe = self
            .prober
            .probe(&staged)
            .await
            .map_err(|e| AppError::Probe(e.to_string()))?;

        tracing::info!(
            video_id = %video.id,
            width = probe.width,
            height = probe.height,
            orientation = %probe.orientation,
            "Video probed"
        );

        let upload_path = if self.config.remux_enabled {
            // ffmpeg can die mid-write and leave a partial output behind, so
            // the derived path is tracked before the process runs.
            let expected = processed_output_path(&staged);
            temp_files.push(expected.clone());
            let processed = self
                .transcoder
                .remux_fast_start(&staged)
                .await
                .map_err(|e| AppError::Transcode(e.to_string()))?;
            if processed != expected {
                temp_files.push(processed.clone());
            }
            processed
        } else {
            staged.clone()
        };

        // The storage key depends on the probed orientation, so it can only
        // be computed at this point.
        let key = format!("{}/{}.mp4", probe.orientation, video.id);

        self.storage
            .upload_file(&key, &upload_path, content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let video_url = match self.config.url_access {
            UrlAccess::Public => self.storage.public_url(&key),
            UrlAccess::Presigned => self
                .storage
                .presigned_url(&key, Duration::from_secs(self.config.presign_ttl_secs))
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?,
        };

        if let Err(update_err) = self.videos.update_video_url(video.id, &video_url).await {
            // The record must never point at a half-committed object, and a
            // failed commit must not leave an orphan behind.
            if let Err(delete_err) = self.storage.delete(&key).await {
                tracing::warn!(
                    video_id = %video.id,
                    key = %key,
                    error = %delete_err,
                    "Failed to delete stored object after metadata update failure"
                );
            }
            return Err(update_err);
        }

        tracing::info!(video_id = %video.id, key = %key, "Video ingest committed");

        let mut updated = video.clone();
        updated.video_url = Some(video_url);
        Ok(updated)
    }
}

async fn cleanup_temp_files(paths: &[PathBuf]) {
    for path in paths {
        remove_temp_file(path).await;
    }
}

async fn remove_temp_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove temp file"
            );
        }
    }
}
