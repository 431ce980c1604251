//! Migration to create the integrations table.
//!
//! An integration is an organization's connection to a third-party channel
//! (social network, publishing platform). The provider-side identifier is
//! unique per organization and doubles as the upsert key.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Integrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Integrations::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Integrations::InternalId).text().not_null())
                    .col(ColumnDef::new(Integrations::Name).text().not_null())
                    .col(ColumnDef::new(Integrations::Type).text().not_null())
                    .col(ColumnDef::new(Integrations::ProviderIdentifier).text().not_null())
                    .col(ColumnDef::new(Integrations::Profile).text().null())
                    .col(ColumnDef::new(Integrations::Picture).text().null())
                    .col(ColumnDef::new(Integrations::Token).text().not_null())
                    .col(ColumnDef::new(Integrations::RefreshToken).text().null())
                    .col(
                        ColumnDef::new(Integrations::TokenExpiration)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Integrations::InBetweenSteps)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Integrations::RefreshNeeded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Integrations::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Integrations::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Integrations::PostingTimes).json_binary().null())
                    .col(ColumnDef::new(Integrations::CustomInstanceDetails).text().null())
                    .col(
                        ColumnDef::new(Integrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Integrations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integrations_organization_id")
                            .from(Integrations::Table, Integrations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Upsert key: one integration per provider-side id per organization
        manager
            .create_index(
                Index::create()
                    .name("idx_integrations_organization_internal")
                    .table(Integrations::Table)
                    .col(Integrations::OrganizationId)
                    .col(Integrations::InternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_integrations_organization_id")
                    .table(Integrations::Table)
                    .col(Integrations::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_integrations_organization_internal")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_integrations_organization_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Integrations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
    OrganizationId,
    InternalId,
    Name,
    Type,
    ProviderIdentifier,
    Profile,
    Picture,
    Token,
    RefreshToken,
    TokenExpiration,
    InBetweenSteps,
    RefreshNeeded,
    Disabled,
    DeletedAt,
    PostingTimes,
    CustomInstanceDetails,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
