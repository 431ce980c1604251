//! # Integrations Library
//!
//! Persistence layer for an organization's connected social and article
//! channels: the integration entities, their repository, picture re-hosting
//! and the configuration, database and tracing plumbing around them.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod repositories;
pub mod storage;
pub mod telemetry;
pub use migration;
