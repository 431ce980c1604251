//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for database entities, providing organization-scoped methods for data access.

pub mod integration;

pub use integration::{
    IntegrationPatch, IntegrationRepository, IntegrationSummary, PostGroup, UpsertIntegration,
};
