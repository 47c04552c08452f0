use sea_orm_migration::prelude::*;

use crate::m20250301_000002_create_catalog::Places;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::PlaceId).string().not_null())
                    .col(ColumnDef::new(Reviews::Title).string().not_null())
                    .col(ColumnDef::new(Reviews::Description).text().not_null())
                    .col(ColumnDef::new(Reviews::Author).string().not_null().default(""))
                    .col(ColumnDef::new(Reviews::Likes).big_integer().not_null().default(0))
                    // JSON arrays of media URLs and comment ids
                    .col(ColumnDef::new(Reviews::Media).text().not_null().default("[]"))
                    .col(ColumnDef::new(Reviews::CommentIds).text().not_null().default("[]"))
                    .col(ColumnDef::new(Reviews::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Reviews::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_place_id")
                            .from(Reviews::Table, Reviews::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_place_id")
                    .table(Reviews::Table)
                    .col(Reviews::PlaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(ColumnDef::new(Comments::User).string().not_null().default(""))
                    .col(ColumnDef::new(Comments::ReviewId).string().not_null())
                    .col(ColumnDef::new(Comments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Comments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_review_id")
                            .from(Comments::Table, Comments::ReviewId)
                            .to(Reviews::Table, Reviews::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_review_id")
                    .table(Comments::Table)
                    .col(Comments::ReviewId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    PlaceId,
    Title,
    Description,
    Author,
    Likes,
    Media,
    CommentIds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    Text,
    User,
    ReviewId,
    CreatedAt,
    UpdatedAt,
}
