use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Categories::Image).string().null())
                    .col(ColumnDef::new(Categories::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Categories::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Places::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Places::Name).string().not_null())
                    .col(ColumnDef::new(Places::NameKey).string().not_null().unique_key())
                    .col(ColumnDef::new(Places::CategoryId).string().not_null())
                    .col(ColumnDef::new(Places::Address).string().null())
                    .col(ColumnDef::new(Places::Phone).string().null())
                    .col(ColumnDef::new(Places::Email).string().null())
                    .col(ColumnDef::new(Places::ReviewsCount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Places::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Places::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_places_category_id")
                            .from(Places::Table, Places::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_places_category_id")
                    .table(Places::Table)
                    .col(Places::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Categories {
    Table,
    Id,
    Name,
    NameKey,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Places {
    Table,
    Id,
    Name,
    NameKey,
    CategoryId,
    Address,
    Phone,
    Email,
    ReviewsCount,
    CreatedAt,
    UpdatedAt,
}
