//! Media transcoder - fast-start remuxing
//!
//! Rewrites an MP4 container so its index atom precedes the media data,
//! copying both streams without re-encoding. The output always lands at a
//! derived path; the input file is never modified.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("ffmpeg exited with non-zero status: {stderr}")]
    ProcessFailed { stderr: String },

    #[error("failed to run ffmpeg: {0}")]
    Io(#[from] std::io::Error),
}

/// Remux seam: produces a fast-start copy of a local MP4 file and returns
/// the output path. Callers own deletion of both input and output.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, TranscodeError>;
}

/// Derive the output path for a remuxed file: `.processed` is inserted
/// before the extension (`x.mp4` -> `x.processed.mp4`).
pub fn processed_output_path(input: &Path) -> PathBuf {
    match input.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => input.with_extension(format!("processed.{}", ext)),
        None => input.with_extension("processed"),
    }
}

/// ffmpeg-backed `Transcoder` implementation.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        let output_path = processed_output_path(input);
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args([
                "-movflags",
                "faststart",
                "-map_metadata",
                "0",
                "-codec",
                "copy",
                "-f",
                "mp4",
                "-y",
            ])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::ProcessFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!(
            input = %input.display(),
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
