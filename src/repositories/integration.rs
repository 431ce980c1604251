//! Integration repository for database operations
//!
//! This module provides the IntegrationRepository struct which encapsulates
//! SeaORM operations for the integrations table. Organization-facing methods
//! are scoped by organization id; soft-deleted rows are hidden from listings
//! but stay visible to point lookups.

use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics::counter;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, FromQueryResult, JoinType, NotSet, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::{RELEASED_INTERNAL_ID_LEN, make_id};
use crate::models::integration::{self, Entity as Integration, IntegrationType, PostingTime};
use crate::models::post::{self, Entity as Post};
use crate::models::{message_group, order};
use crate::storage::{PictureUrls, UploadStorage};

/// Token lifetime assumed when the provider does not report one
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 999_999_999;

/// Daily posting anchors in minutes from midnight: morning, midday, evening
pub const DEFAULT_POSTING_ANCHORS: [i32; 3] = [560, 850, 1140];

/// Tokens expiring within this window are due for refresh
const REFRESH_WINDOW_HOURS: i64 = 24;

/// Default posting slots for an integration whose owner is `timezone` minutes off UTC
pub fn default_posting_times(timezone: i32) -> Vec<PostingTime> {
    DEFAULT_POSTING_ANCHORS
        .iter()
        .map(|anchor| PostingTime {
            time: anchor - timezone,
        })
        .collect()
}

/// Parameters for [`IntegrationRepository::create_or_update_integration`]
#[derive(Debug, Clone)]
pub struct UpsertIntegration {
    pub organization_id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub integration_type: IntegrationType,
    /// Provider-side id; together with the organization it is the upsert key
    pub internal_id: String,
    pub provider: String,
    pub token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds; zero leaves the stored expiration untouched
    pub expires_in: i64,
    pub username: Option<String>,
    pub is_between_steps: bool,
    /// Set when the upsert comes from a token refresh
    pub refresh: Option<String>,
    /// Owner's offset from UTC in minutes
    pub timezone: Option<i32>,
    pub custom_instance_details: Option<String>,
}

impl UpsertIntegration {
    pub fn new(
        organization_id: Uuid,
        name: impl Into<String>,
        integration_type: IntegrationType,
        internal_id: impl Into<String>,
        provider: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            organization_id,
            name: name.into(),
            picture: None,
            integration_type,
            internal_id: internal_id.into(),
            provider: provider.into(),
            token: token.into(),
            refresh_token: String::new(),
            expires_in: DEFAULT_EXPIRES_IN_SECONDS,
            username: None,
            is_between_steps: false,
            refresh: None,
            timezone: None,
            custom_instance_details: None,
        }
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    pub fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_in = seconds;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn between_steps(mut self, in_between_steps: bool) -> Self {
        self.is_between_steps = in_between_steps;
        self
    }

    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = Some(refresh.into());
        self
    }

    pub fn with_timezone(mut self, timezone: i32) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn with_custom_instance_details(mut self, details: impl Into<String>) -> Self {
        self.custom_instance_details = Some(details.into());
        self
    }

    fn is_refresh(&self) -> bool {
        self.refresh.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Partial update of an integration.
///
/// `None` leaves a column untouched. For nullable columns the inner option
/// distinguishes "set to this value" (`Some(Some(v))`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationPatch {
    pub name: Option<String>,
    pub picture: Option<Option<String>>,
    pub profile: Option<Option<String>>,
    pub provider_identifier: Option<String>,
    pub token: Option<String>,
    pub refresh_token: Option<Option<String>>,
    pub token_expiration: Option<Option<DateTimeWithTimeZone>>,
    pub in_between_steps: Option<bool>,
    pub refresh_needed: Option<bool>,
    pub disabled: Option<bool>,
    pub posting_times: Option<Option<Vec<PostingTime>>>,
    pub custom_instance_details: Option<Option<String>>,
}

impl IntegrationPatch {
    /// True when applying the patch would not change any column
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, model: &mut integration::ActiveModel) -> Result<(), serde_json::Error> {
        if let Some(name) = self.name {
            model.name = Set(name);
        }
        if let Some(picture) = self.picture {
            model.picture = Set(picture);
        }
        if let Some(profile) = self.profile {
            model.profile = Set(profile);
        }
        if let Some(provider_identifier) = self.provider_identifier {
            model.provider_identifier = Set(provider_identifier);
        }
        if let Some(token) = self.token {
            model.token = Set(token);
        }
        if let Some(refresh_token) = self.refresh_token {
            model.refresh_token = Set(refresh_token);
        }
        if let Some(token_expiration) = self.token_expiration {
            model.token_expiration = Set(token_expiration);
        }
        if let Some(in_between_steps) = self.in_between_steps {
            model.in_between_steps = Set(in_between_steps);
        }
        if let Some(refresh_needed) = self.refresh_needed {
            model.refresh_needed = Set(refresh_needed);
        }
        if let Some(disabled) = self.disabled {
            model.disabled = Set(disabled);
        }
        if let Some(posting_times) = self.posting_times {
            model.posting_times = Set(posting_times.map(serde_json::to_value).transpose()?);
        }
        if let Some(details) = self.custom_instance_details {
            model.custom_instance_details = Set(details);
        }
        Ok(())
    }
}

/// Narrow projection of an integration returned to order participants
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct IntegrationSummary {
    pub id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub in_between_steps: bool,
    pub provider_identifier: String,
}

/// A distinct post group published through a channel
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct PostGroup {
    pub group: String,
}

/// Repository for integration database operations
#[derive(Clone)]
pub struct IntegrationRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Re-hosts pictures that are not already served from our roots
    storage: Arc<dyn UploadStorage>,
    picture_urls: PictureUrls,
}

impl IntegrationRepository {
    /// Creates a new IntegrationRepository instance
    ///
    /// # Arguments
    ///
    /// * `db` - Database connection pool
    /// * `storage` - Upload backend used to re-host pictures
    /// * `picture_urls` - Roots that mark a picture as already re-hosted
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn UploadStorage>,
        picture_urls: PictureUrls,
    ) -> Self {
        Self {
            db,
            storage,
            picture_urls,
        }
    }

    /// Overwrites the posting schedule of an integration, returning its id
    pub async fn set_times(
        &self,
        organization_id: Uuid,
        id: Uuid,
        times: &[PostingTime],
    ) -> RepositoryResult<Uuid> {
        let value = serde_json::to_value(times)?;
        let updated = update_scoped(&*self.db, organization_id, id, |model| {
            model.posting_times = Set(Some(value));
        })
        .await?;

        debug!(
            organization_id = %organization_id,
            integration_id = %id,
            slots = times.len(),
            "Posting times replaced"
        );

        Ok(updated.id)
    }

    /// Applies a partial update to an integration within an organization.
    ///
    /// A picture that does not already point at both the CDN bucket and the
    /// frontend is re-hosted first and the uploaded URL is stored instead.
    /// Load, upload and write run in one transaction; an upload failure
    /// rolls it back and nothing is written. The transaction holds a pooled
    /// connection for the whole upload, which for a remote picture can last
    /// up to the storage fetch timeout.
    pub async fn update_integration(
        &self,
        organization_id: Uuid,
        id: Uuid,
        mut patch: IntegrationPatch,
    ) -> RepositoryResult<integration::Model> {
        let txn = self.db.begin().await?;

        let existing = find_scoped(&txn, organization_id, id)
            .await?
            .ok_or(RepositoryError::NotFound { id })?;

        if let Some(Some(picture)) = patch.picture.as_ref()
            && !picture.is_empty()
            && !self.picture_urls.is_canonical(picture)
        {
            let uploaded = self.storage.upload_simple(picture).await.map_err(|err| {
                warn!(
                    organization_id = %organization_id,
                    integration_id = %id,
                    error = %err,
                    "Picture upload failed; update aborted"
                );
                err
            })?;
            counter!("integration_picture_uploads_total").increment(1);
            patch.picture = Some(Some(uploaded));
        }

        let mut model: integration::ActiveModel = existing.into();
        patch.apply(&mut model)?;
        model.updated_at = Set(Utc::now().fixed_offset());

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Flags an integration as needing re-authorization
    pub async fn disconnect_channel(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<integration::Model> {
        let updated = update_scoped(&*self.db, organization_id, id, |model| {
            model.refresh_needed = Set(true);
        })
        .await?;

        info!(
            organization_id = %organization_id,
            integration_id = %id,
            "Channel disconnected"
        );

        Ok(updated)
    }

    /// Creates an integration, or updates the one already registered for
    /// `(organization, internal_id)`.
    ///
    /// On update the name, posting schedule, disabled state and custom
    /// instance details are preserved; the soft-delete marker is cleared and
    /// `refresh_needed` reset. A refresh-triggered update keeps the stored
    /// `in_between_steps` flag.
    pub async fn create_or_update_integration(
        &self,
        params: UpsertIntegration,
    ) -> RepositoryResult<integration::Model> {
        let now = Utc::now().fixed_offset();
        let refreshing = params.is_refresh();

        let picture = params.picture.filter(|p| !p.is_empty());
        let custom_instance_details = params.custom_instance_details.filter(|d| !d.is_empty());
        let token_expiration = if params.expires_in != 0 {
            Duration::try_seconds(params.expires_in).and_then(|lifetime| now.checked_add_signed(lifetime))
        } else {
            None
        };
        let posting_times = params
            .timezone
            .map(|timezone| serde_json::to_value(default_posting_times(timezone)))
            .transpose()?;

        let mut update_columns = vec![
            integration::Column::IntegrationType,
            integration::Column::ProviderIdentifier,
            integration::Column::Token,
            integration::Column::RefreshToken,
            integration::Column::DeletedAt,
            integration::Column::RefreshNeeded,
            integration::Column::UpdatedAt,
        ];
        if !refreshing {
            update_columns.push(integration::Column::InBetweenSteps);
        }
        if picture.is_some() {
            update_columns.push(integration::Column::Picture);
        }
        if params.username.is_some() {
            update_columns.push(integration::Column::Profile);
        }
        if token_expiration.is_some() {
            update_columns.push(integration::Column::TokenExpiration);
        }

        let model = integration::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(params.organization_id),
            internal_id: Set(params.internal_id.clone()),
            name: Set(params.name),
            integration_type: Set(params.integration_type),
            provider_identifier: Set(params.provider.clone()),
            profile: set_if_present(params.username),
            picture: set_if_present(picture),
            token: Set(params.token),
            refresh_token: Set(Some(params.refresh_token)),
            token_expiration: set_if_present(token_expiration),
            in_between_steps: Set(params.is_between_steps),
            refresh_needed: Set(false),
            disabled: Set(false),
            deleted_at: Set(None),
            posting_times: set_if_present(posting_times),
            custom_instance_details: set_if_present(custom_instance_details),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let on_conflict = OnConflict::columns([
            integration::Column::OrganizationId,
            integration::Column::InternalId,
        ])
        .update_columns(update_columns)
        .to_owned();

        Integration::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(&*self.db)
            .await?;

        let persisted = Integration::find()
            .filter(integration::Column::OrganizationId.eq(params.organization_id))
            .filter(integration::Column::InternalId.eq(params.internal_id.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "integration '{}' not persisted",
                    params.internal_id
                ))
            })?;

        counter!("integration_upserts_total", "provider" => params.provider.clone()).increment(1);
        info!(
            organization_id = %params.organization_id,
            integration_id = %persisted.id,
            provider = %params.provider,
            refresh = refreshing,
            "Integration upserted"
        );

        Ok(persisted)
    }

    /// Lists live integrations whose token expires within the next day and
    /// that are not waiting on the user (in-between steps or refresh needed)
    pub async fn needs_to_be_refreshed(&self) -> RepositoryResult<Vec<integration::Model>> {
        let cutoff = Utc::now().fixed_offset() + Duration::hours(REFRESH_WINDOW_HOURS);

        Ok(Integration::find()
            .filter(integration::Column::TokenExpiration.lte(cutoff))
            .filter(integration::Column::InBetweenSteps.eq(false))
            .filter(integration::Column::DeletedAt.is_null())
            .filter(integration::Column::RefreshNeeded.eq(false))
            .order_by_asc(integration::Column::TokenExpiration)
            .all(&*self.db)
            .await?)
    }

    /// Flags an integration for an out-of-band token refresh
    pub async fn refresh_needed(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<integration::Model> {
        update_scoped(&*self.db, organization_id, id, |model| {
            model.refresh_needed = Set(true);
        })
        .await
    }

    /// Updates the display name and/or picture URL of an integration.
    ///
    /// Absent or empty values leave the column untouched. Not organization
    /// scoped: used by provider-side profile syncs that only know the id.
    pub async fn update_name_and_url(
        &self,
        id: Uuid,
        name: Option<&str>,
        url: Option<&str>,
    ) -> RepositoryResult<integration::Model> {
        let existing = Integration::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(RepositoryError::NotFound { id })?;

        let mut model: integration::ActiveModel = existing.into();
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            model.name = Set(name.to_string());
        }
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            model.picture = Set(Some(url.to_string()));
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        Ok(model.update(&*self.db).await?)
    }

    /// Finds an integration by id within an organization, including soft-deleted ones
    pub async fn get_integration_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<integration::Model>> {
        find_scoped(&*self.db, organization_id, id).await
    }

    /// Looks up the integration behind an order for one of its participants.
    ///
    /// Matches a post published through integration `id` and submitted for
    /// `order_id`, where the order's message group has `user_id` as seller
    /// or buyer, or `organization_id` as the buyer's organization. Returns
    /// `None` when no such post exists or the caller is not a participant.
    pub async fn get_integration_for_order(
        &self,
        id: Uuid,
        order_id: Uuid,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RepositoryResult<Option<IntegrationSummary>> {
        let participant = Condition::any()
            .add(message_group::Column::SellerId.eq(user_id))
            .add(message_group::Column::BuyerId.eq(user_id))
            .add(message_group::Column::BuyerOrganizationId.eq(organization_id));

        Ok(Integration::find()
            .select_only()
            .column(integration::Column::Id)
            .column(integration::Column::Name)
            .column(integration::Column::Picture)
            .column(integration::Column::InBetweenSteps)
            .column(integration::Column::ProviderIdentifier)
            .join(JoinType::InnerJoin, integration::Relation::Posts.def())
            .join(JoinType::InnerJoin, post::Relation::Order.def())
            .join(JoinType::InnerJoin, order::Relation::MessageGroup.def())
            .filter(post::Column::IntegrationId.eq(id))
            .filter(order::Column::Id.eq(order_id))
            .filter(participant)
            .into_model::<IntegrationSummary>()
            .one(&*self.db)
            .await?)
    }

    /// Lists an organization's integrations, excluding soft-deleted ones
    pub async fn get_integrations_list(
        &self,
        organization_id: Uuid,
    ) -> RepositoryResult<Vec<integration::Model>> {
        Ok(Integration::find()
            .filter(integration::Column::OrganizationId.eq(organization_id))
            .filter(integration::Column::DeletedAt.is_null())
            .order_by_asc(integration::Column::CreatedAt)
            .order_by_asc(integration::Column::Id)
            .all(&*self.db)
            .await?)
    }

    pub async fn disable_channel(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        update_scoped(&*self.db, organization_id, id, |model| {
            model.disabled = Set(true);
        })
        .await?;
        Ok(())
    }

    pub async fn enable_channel(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        update_scoped(&*self.db, organization_id, id, |model| {
            model.disabled = Set(false);
        })
        .await?;
        Ok(())
    }

    /// Distinct groups of live posts published through a channel
    pub async fn get_posts_for_channel(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Vec<PostGroup>> {
        Ok(Post::find()
            .select_only()
            .column(post::Column::Group)
            .filter(post::Column::OrganizationId.eq(organization_id))
            .filter(post::Column::IntegrationId.eq(id))
            .filter(post::Column::DeletedAt.is_null())
            .group_by(post::Column::Group)
            .order_by_asc(post::Column::Group)
            .into_model::<PostGroup>()
            .all(&*self.db)
            .await?)
    }

    /// Soft-deletes an integration
    pub async fn delete_channel(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<integration::Model> {
        let now = Utc::now().fixed_offset();
        let deleted = update_scoped(&*self.db, organization_id, id, |model| {
            model.deleted_at = Set(Some(now));
        })
        .await?;

        info!(
            organization_id = %organization_id,
            integration_id = %id,
            "Channel soft-deleted"
        );

        Ok(deleted)
    }

    /// Releases the `(organization, page)` key held by a soft-deleted
    /// integration by giving it a fresh random internal id, so the same
    /// provider page can be connected again. Live rows are never touched.
    ///
    /// # Returns
    ///
    /// The number of rows whose internal id was regenerated
    pub async fn check_for_deleted_once_and_update(
        &self,
        organization_id: Uuid,
        page: &str,
    ) -> RepositoryResult<u64> {
        let result = Integration::update_many()
            .col_expr(
                integration::Column::InternalId,
                Expr::value(make_id(RELEASED_INTERNAL_ID_LEN)),
            )
            .col_expr(
                integration::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(integration::Column::OrganizationId.eq(organization_id))
            .filter(integration::Column::InternalId.eq(page))
            .filter(integration::Column::DeletedAt.is_not_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            debug!(
                organization_id = %organization_id,
                page = %page,
                released = result.rows_affected,
                "Released internal id held by deleted integration"
            );
        }

        Ok(result.rows_affected)
    }

    /// Disables up to `total_channels` enabled, live integrations of an
    /// organization. Selection and update share one transaction, so either
    /// every selected channel is disabled or none is.
    ///
    /// # Returns
    ///
    /// The number of integrations disabled
    pub async fn disable_integrations(
        &self,
        organization_id: Uuid,
        total_channels: u64,
    ) -> RepositoryResult<u64> {
        if total_channels == 0 {
            return Ok(0);
        }

        let txn = self.db.begin().await?;

        let ids: Vec<Uuid> = Integration::find()
            .select_only()
            .column(integration::Column::Id)
            .filter(integration::Column::OrganizationId.eq(organization_id))
            .filter(integration::Column::Disabled.eq(false))
            .filter(integration::Column::DeletedAt.is_null())
            .order_by_asc(integration::Column::CreatedAt)
            .limit(total_channels)
            .into_tuple()
            .all(&txn)
            .await?;

        if ids.is_empty() {
            txn.commit().await?;
            return Ok(0);
        }

        let result = Integration::update_many()
            .col_expr(integration::Column::Disabled, Expr::value(true))
            .col_expr(
                integration::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(integration::Column::Id.is_in(ids))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        counter!("integration_channels_disabled_total").increment(result.rows_affected);
        info!(
            organization_id = %organization_id,
            requested = total_channels,
            disabled = result.rows_affected,
            "Disabled integrations"
        );

        Ok(result.rows_affected)
    }
}

async fn find_scoped<C>(
    db: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepositoryResult<Option<integration::Model>>
where
    C: ConnectionTrait,
{
    Ok(Integration::find_by_id(id)
        .filter(integration::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?)
}

/// Loads an integration within an organization, applies `change` and persists it
async fn update_scoped<C, F>(
    db: &C,
    organization_id: Uuid,
    id: Uuid,
    change: F,
) -> RepositoryResult<integration::Model>
where
    C: ConnectionTrait,
    F: FnOnce(&mut integration::ActiveModel),
{
    let existing = find_scoped(db, organization_id, id)
        .await?
        .ok_or(RepositoryError::NotFound { id })?;

    let mut model: integration::ActiveModel = existing.into();
    change(&mut model);
    model.updated_at = Set(Utc::now().fixed_offset());

    Ok(model.update(db).await?)
}

fn set_if_present<T>(value: Option<T>) -> ActiveValue<Option<T>>
where
    Option<T>: Into<sea_orm::Value>,
{
    match value {
        Some(value) => Set(Some(value)),
        None => NotSet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blank_model() -> integration::ActiveModel {
        let now = Utc::now().fixed_offset();
        integration::Model {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            internal_id: "page".to_string(),
            name: "Before".to_string(),
            integration_type: IntegrationType::Social,
            provider_identifier: "x".to_string(),
            profile: Some("handle".to_string()),
            picture: Some("https://cdn.test/a.png".to_string()),
            token: "t".to_string(),
            refresh_token: None,
            token_expiration: None,
            in_between_steps: false,
            refresh_needed: false,
            disabled: false,
            deleted_at: None,
            posting_times: None,
            custom_instance_details: None,
            created_at: now,
            updated_at: now,
        }
        .into()
    }

    #[test]
    fn posting_times_shift_anchors_by_timezone() {
        let times: Vec<i32> = default_posting_times(120).iter().map(|t| t.time).collect();
        assert_eq!(times, vec![440, 730, 1020]);

        let times: Vec<i32> = default_posting_times(-300).iter().map(|t| t.time).collect();
        assert_eq!(times, vec![860, 1150, 1440]);

        let times: Vec<i32> = default_posting_times(0).iter().map(|t| t.time).collect();
        assert_eq!(times, DEFAULT_POSTING_ANCHORS.to_vec());
    }

    #[test]
    fn upsert_defaults() {
        let params = UpsertIntegration::new(
            Uuid::nil(),
            "Blog",
            IntegrationType::Article,
            "blog-1",
            "devto",
            "tok",
        );
        assert_eq!(params.expires_in, DEFAULT_EXPIRES_IN_SECONDS);
        assert_eq!(params.refresh_token, "");
        assert!(!params.is_between_steps);
        assert!(!params.is_refresh());
        assert!(!params.clone().with_refresh("").is_refresh());
        assert!(params.with_refresh("r").is_refresh());
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let patch = IntegrationPatch::default();
        assert!(patch.is_empty());

        let mut model = blank_model();
        patch.apply(&mut model).unwrap();
        assert!(!model.is_changed());
    }

    #[test]
    fn patch_distinguishes_clear_from_untouched() {
        let patch = IntegrationPatch {
            name: Some("After".to_string()),
            profile: Some(None),
            posting_times: Some(Some(vec![PostingTime { time: 60 }])),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let mut model = blank_model();
        patch.apply(&mut model).unwrap();

        assert_eq!(model.name, Set("After".to_string()));
        assert_eq!(model.profile, Set(None));
        assert_eq!(model.posting_times, Set(Some(json!([{ "time": 60 }]))));
        assert!(!model.picture.is_set());
        assert!(!model.disabled.is_set());
    }
}
