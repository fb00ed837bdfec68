//! Media probing and remuxing via external ffmpeg-family processes.
//!
//! Both operations are exposed behind narrow traits (`Prober`, `Transcoder`)
//! so the ingest orchestrator can be exercised in tests with canned results
//! instead of real subprocesses.

pub mod probe;
pub mod transcode;

pub use probe::{classify_dimensions, FfprobeProber, Orientation, ProbeError, ProbeResult, Prober};
pub use transcode::{processed_output_path, FfmpegTranscoder, TranscodeError, Transcoder};
