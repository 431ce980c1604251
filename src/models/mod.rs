//! # Data Models
//!
//! SeaORM entities for integrations and the records they are read alongside.

pub mod integration;
pub mod message_group;
pub mod order;
pub mod organization;
pub mod post;

pub use integration::Entity as Integration;
pub use integration::{IntegrationType, PostingTime};
pub use message_group::Entity as MessageGroup;
pub use order::Entity as Order;
pub use organization::Entity as Organization;
pub use post::Entity as Post;
