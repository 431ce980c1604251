//! Migration to create the message_groups table.
//!
//! A message group links a seller, a buyer and the buyer's organization;
//! it is the access boundary for order-scoped integration lookups.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageGroups::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MessageGroups::SellerId).uuid().not_null())
                    .col(ColumnDef::new(MessageGroups::BuyerId).uuid().not_null())
                    .col(
                        ColumnDef::new(MessageGroups::BuyerOrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MessageGroups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_groups_buyer_organization_id")
                            .from(MessageGroups::Table, MessageGroups::BuyerOrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageGroups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MessageGroups {
    Table,
    Id,
    SellerId,
    BuyerId,
    BuyerOrganizationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
