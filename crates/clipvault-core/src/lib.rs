//! Core types shared across the clipvault workspace: configuration,
//! the unified error taxonomy, and domain models.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, UrlAccess};
pub use error::{AppError, ErrorMetadata, LogLevel};
