//! HTTP surface and ingest orchestration for clipvault.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
