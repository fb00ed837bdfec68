//! Object storage abstraction and its S3 implementation.
//!
//! Storage keys are decided by callers; this crate is a thin capability over
//! "put bytes at key" and "sign key for time-limited access".

mod s3;
mod traits;

pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
