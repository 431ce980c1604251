//! Integration entity model
//!
//! This module contains the SeaORM entity model for the integrations table,
//! which stores an organization's connections to third-party channels.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Kind of channel behind an integration
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum IntegrationType {
    #[sea_orm(string_value = "article")]
    Article,
    #[sea_orm(string_value = "social")]
    Social,
}

/// A daily posting slot, in minutes from midnight UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingTime {
    pub time: i32,
}

/// Integration entity representing an organization's connected channel
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    /// Unique identifier for the integration (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization
    pub organization_id: Uuid,

    /// Provider-side identifier (unique per organization)
    pub internal_id: String,

    /// Display name of the channel
    pub name: String,

    #[sea_orm(column_name = "type")]
    pub integration_type: IntegrationType,

    /// Provider name, e.g. "linkedin" or "devto"
    pub provider_identifier: String,

    /// Username on the provider
    pub profile: Option<String>,

    /// Avatar URL
    pub picture: Option<String>,

    #[serde(skip_serializing)]
    pub token: String,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    pub token_expiration: Option<DateTimeWithTimeZone>,

    /// True while a multi-step connection flow has not completed
    pub in_between_steps: bool,

    /// Set when the channel must be re-authorized or refreshed out of band
    pub refresh_needed: bool,

    pub disabled: bool,

    /// Soft-delete marker
    pub deleted_at: Option<DateTimeWithTimeZone>,

    /// Ordered list of `{ "time": minutes }` slots
    #[sea_orm(column_type = "JsonBinary")]
    pub posting_times: Option<JsonValue>,

    pub custom_instance_details: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the record has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Decodes the stored posting slots; an unset or malformed column yields an empty list
    pub fn posting_times(&self) -> Vec<PostingTime> {
        self.posting_times
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(posting_times: Option<JsonValue>) -> Model {
        let now = chrono::Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            internal_id: "page-1".to_string(),
            name: "Page".to_string(),
            integration_type: IntegrationType::Social,
            provider_identifier: "facebook".to_string(),
            profile: None,
            picture: None,
            token: "secret".to_string(),
            refresh_token: None,
            token_expiration: None,
            in_between_steps: false,
            refresh_needed: false,
            disabled: false,
            deleted_at: None,
            posting_times,
            custom_instance_details: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn decodes_posting_times_in_order() {
        let model = sample(Some(json!([{ "time": 560 }, { "time": 850 }, { "time": 1140 }])));
        let times: Vec<i32> = model.posting_times().iter().map(|slot| slot.time).collect();
        assert_eq!(times, vec![560, 850, 1140]);
    }

    #[test]
    fn missing_or_malformed_posting_times_decode_empty() {
        assert!(sample(None).posting_times().is_empty());
        assert!(sample(Some(json!({ "time": 1 }))).posting_times().is_empty());
    }

    #[test]
    fn serialization_hides_tokens() {
        let value = serde_json::to_value(sample(None)).unwrap();
        assert!(value.get("token").is_none());
        assert!(value.get("refresh_token").is_none());
        assert_eq!(value["integration_type"], "social");
    }
}
