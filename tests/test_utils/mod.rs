//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations, entity fixtures, and a recording upload backend.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use integrations::models::{integration, message_group, order, organization, post};
use integrations::repositories::IntegrationRepository;
use integrations::storage::{PictureUrls, StorageError, UploadStorage};
use migration::{Migrator, MigratorTrait};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const CDN_BUCKET_URL: &str = "https://cdn.test";
pub const FRONTEND_URL: &str = "https://app.test";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// # Returns
///
/// Returns a Result containing the database connection
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // Fixtures below create parents explicitly; FK checks stay off so single
    // tests can insert orphan rows when the parent is irrelevant.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Upload backend that records every source and answers with a fixed URL
#[derive(Debug, Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<String>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every upload fails
    pub fn failing() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

/// URL the recording backend returns for an upload
#[allow(dead_code)]
pub fn rehosted_url(source: &str) -> String {
    format!(
        "{}/{}/uploads/{}",
        CDN_BUCKET_URL,
        FRONTEND_URL,
        source.len()
    )
}

#[async_trait]
impl UploadStorage for RecordingStorage {
    async fn upload_simple(&self, source: &str) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push(source.to_string());
        if self.fail {
            return Err(StorageError::UpstreamStatus {
                url: source.to_string(),
                status: 502,
            });
        }
        Ok(rehosted_url(source))
    }
}

/// Builds a repository over `db` backed by `storage`.
#[allow(dead_code)]
pub fn repository(
    db: Arc<DatabaseConnection>,
    storage: Arc<RecordingStorage>,
) -> IntegrationRepository {
    IntegrationRepository::new(
        db,
        storage,
        PictureUrls::new(CDN_BUCKET_URL, FRONTEND_URL),
    )
}

/// Creates a test organization in the database.
///
/// # Returns
///
/// Returns a Result containing the organization ID
#[allow(dead_code)]
pub async fn create_test_organization(db: &DatabaseConnection) -> Result<Uuid> {
    let id = Uuid::new_v4();
    organization::ActiveModel {
        id: Set(id),
        name: Set(format!("Org {}", &id.to_string()[..8])),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await?;
    Ok(id)
}

/// Knobs for [`insert_integration`]
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct IntegrationFixture {
    pub internal_id: String,
    pub token_expiration: Option<DateTimeWithTimeZone>,
    pub in_between_steps: bool,
    pub refresh_needed: bool,
    pub disabled: bool,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl Default for IntegrationFixture {
    fn default() -> Self {
        Self {
            internal_id: format!("page-{}", Uuid::new_v4().simple()),
            token_expiration: None,
            in_between_steps: false,
            refresh_needed: false,
            disabled: false,
            deleted_at: None,
            created_at: Utc::now().fixed_offset(),
        }
    }
}

/// Inserts an integration row directly for testing.
#[allow(dead_code)]
pub async fn insert_integration(
    db: &DatabaseConnection,
    organization_id: Uuid,
    fixture: IntegrationFixture,
) -> Result<integration::Model> {
    let model = integration::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        internal_id: Set(fixture.internal_id),
        name: Set("Fixture channel".to_string()),
        integration_type: Set(integration::IntegrationType::Social),
        provider_identifier: Set("linkedin".to_string()),
        profile: Set(Some("fixture".to_string())),
        picture: Set(None),
        token: Set("token".to_string()),
        refresh_token: Set(Some("refresh".to_string())),
        token_expiration: Set(fixture.token_expiration),
        in_between_steps: Set(fixture.in_between_steps),
        refresh_needed: Set(fixture.refresh_needed),
        disabled: Set(fixture.disabled),
        deleted_at: Set(fixture.deleted_at),
        posting_times: Set(None),
        custom_instance_details: Set(None),
        created_at: Set(fixture.created_at),
        updated_at: Set(fixture.created_at),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Inserts a post published through `integration_id`.
#[allow(dead_code)]
pub async fn insert_post(
    db: &DatabaseConnection,
    organization_id: Uuid,
    integration_id: Uuid,
    group: &str,
    submitted_for_order_id: Option<Uuid>,
    deleted: bool,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    post::ActiveModel {
        id: Set(id),
        organization_id: Set(organization_id),
        integration_id: Set(integration_id),
        group: Set(group.to_string()),
        submitted_for_order_id: Set(submitted_for_order_id),
        deleted_at: Set(deleted.then_some(now)),
        created_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(id)
}

/// Creates an order inside a message group between a seller and a buyer.
///
/// # Returns
///
/// Returns a Result containing the order ID
#[allow(dead_code)]
pub async fn create_order(
    db: &DatabaseConnection,
    seller_id: Uuid,
    buyer_id: Uuid,
    buyer_organization_id: Uuid,
) -> Result<Uuid> {
    let now = Utc::now().fixed_offset();
    let group_id = Uuid::new_v4();
    message_group::ActiveModel {
        id: Set(group_id),
        seller_id: Set(seller_id),
        buyer_id: Set(buyer_id),
        buyer_organization_id: Set(buyer_organization_id),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    let order_id = Uuid::new_v4();
    order::ActiveModel {
        id: Set(order_id),
        message_group_id: Set(group_id),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(order_id)
}
