//! Media prober - stream inspection and orientation classification
//!
//! Invokes ffprobe on a local file, restricted to the first video stream,
//! and buckets the aspect ratio into landscape, portrait or other.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Coarse aspect-ratio bucket for an ingested video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Result of probing a local media file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    /// The matched reference aspect ratio (16/9 or 9/16); `None` for `Other`.
    pub ratio: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe exited with non-zero status: {stderr}")]
    ProcessFailed { stderr: String },

    #[error("malformed ffprobe output: {0}")]
    MalformedOutput(String),

    #[error("failed to run ffprobe: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream-inspection seam: returns a `ProbeResult` for a local media file.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError>;
}

/// Reference ratios checked in order; the first strict minimum wins, so a
/// square input (which ties) classifies as landscape.
const ASPECT_REFERENCES: [(Orientation, f64); 2] = [
    (Orientation::Landscape, 16.0 / 9.0),
    (Orientation::Portrait, 9.0 / 16.0),
];

/// Bucket raw dimensions into an orientation plus the matched reference ratio.
///
/// Ratios are compared on a log scale, which keeps the two references
/// equidistant from a 1:1 input.
pub fn classify_dimensions(width: u32, height: u32) -> (Orientation, Option<f64>) {
    let ratio = width as f64 / height as f64;
    if !ratio.is_finite() || ratio <= 0.0 {
        return (Orientation::Other, None);
    }

    let mut best: Option<(Orientation, f64, f64)> = None;
    for (orientation, reference) in ASPECT_REFERENCES {
        let difference = (ratio.ln() - reference.ln()).abs();
        let improves = match best {
            Some((_, _, min)) => difference < min,
            None => true,
        };
        if improves {
            best = Some((orientation, reference, difference));
        }
    }

    match best {
        Some((orientation, reference, _)) => (orientation, Some(reference)),
        None => (Orientation::Other, None),
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract (width, height) of the first video stream from ffprobe JSON.
fn parse_probe_output(stdout: &[u8]) -> Result<(u32, u32), ProbeError> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::MalformedOutput(e.to_string()))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| ProbeError::MalformedOutput("no video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(ProbeError::MalformedOutput(
            "first video stream is missing width or height".to_string(),
        )),
    }
}

/// ffprobe-backed `Prober` implementation.
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String) -> Self {
        Self { ffprobe_path }
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "json",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProbeError::ProcessFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let (width, height) = parse_probe_output(&output.stdout)?;
        let (orientation, ratio) = classify_dimensions(width, height);

        tracing::debug!(
            path = %path.display(),
            width,
            height,
            orientation = %orientation,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Probe completed"
        );

        Ok(ProbeResult {
            width,
            height,
            orientation,
            ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_input_classifies_landscape() {
        let (orientation, ratio) = classify_dimensions(1280, 720);
        assert_eq!(orientation, Orientation::Landscape);
        assert_eq!(ratio, Some(16.0 / 9.0));
    }

    #[test]
    fn tall_input_classifies_portrait() {
        let (orientation, ratio) = classify_dimensions(720, 1280);
        assert_eq!(orientation, Orientation::Portrait);
        assert_eq!(ratio, Some(9.0 / 16.0));
    }

    #[test]
    fn square_input_ties_to_landscape() {
        // Both references are equidistant from 1:1; the first-checked bucket wins.
        let (orientation, ratio) = classify_dimensions(1000, 1000);
        assert_eq!(orientation, Orientation::Landscape);
        assert_eq!(ratio, Some(16.0 / 9.0));
    }

    #[test]
    fn near_reference_ratios_snap_to_their_bucket() {
        assert_eq!(classify_dimensions(1920, 1080).0, Orientation::Landscape);
        assert_eq!(classify_dimensions(1080, 1920).0, Orientation::Portrait);
        assert_eq!(classify_dimensions(3840, 2160).0, Orientation::Landscape);
    }

    #[test]
    fn degenerate_dimensions_classify_other() {
        let (orientation, ratio) = classify_dimensions(0, 720);
        assert_eq!(orientation, Orientation::Other);
        assert_eq!(ratio, None);

        let (orientation, ratio) = classify_dimensions(1280, 0);
        assert_eq!(orientation, Orientation::Other);
        assert_eq!(ratio, None);
    }

    #[test]
    fn parses_ffprobe_stream_dimensions() {
        let stdout = br#"{"programs":[],"streams":[{"width":1280,"height":720}]}"#;
        assert_eq!(parse_probe_output(stdout).unwrap(), (1280, 720));
    }

    #[test]
    fn rejects_output_without_streams() {
        let stdout = br#"{"programs":[],"streams":[]}"#;
        let err = parse_probe_output(stdout).unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_stream_missing_height() {
        let stdout = br#"{"streams":[{"width":1280}]}"#;
        let err = parse_probe_output(stdout).unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_probe_output(b"not json").unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput(_)));
    }

    #[test]
    fn orientation_displays_lowercase() {
        assert_eq!(Orientation::Landscape.to_string(), "landscape");
        assert_eq!(Orientation::Portrait.to_string(), "portrait");
        assert_eq!(Orientation::Other.to_string(), "other");
    }
}
