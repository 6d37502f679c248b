use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tables in order of dependencies
        self.create_devices_table(manager).await?;
        self.create_entity_types_table(manager).await?;
        self.create_entity_values_table(manager).await?;
        self.create_string_types_table(manager).await?;
        self.create_string_values_table(manager).await?;
        self.create_examples_table(manager).await?;

        // Create indexes
        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(Examples::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StringValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StringTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EntityValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EntityTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    // Helper functions for database-specific types
    fn create_bigint_pk_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            // SQLite rowid aliasing requires a plain INTEGER primary key
            sea_orm::DatabaseBackend::Sqlite => col.integer().not_null().auto_increment(),
            _ => col.big_integer().not_null().auto_increment(),
        };
        col
    }

    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    // Table creation methods
    async fn create_devices_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Devices::PrimaryKind)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Devices::Name).string().not_null())
                    .col(ColumnDef::new(Devices::OwnerOrg).big_integer())
                    .col(ColumnDef::new(Devices::Factory).text())
                    .col(
                        ColumnDef::new(Devices::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(self.create_timestamp_column(manager, Devices::CreatedAt))
                    .col(self.create_timestamp_column(manager, Devices::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_entity_types_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntityTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntityTypes::Language).string().not_null())
                    .col(ColumnDef::new(EntityTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(EntityTypes::IsWellKnown)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EntityTypes::HasNerSupport)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(self.create_timestamp_column(manager, EntityTypes::CreatedAt))
                    .col(self.create_timestamp_column(manager, EntityTypes::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_entity_values_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntityValues::Table)
                    .if_not_exists()
                    .col(
                        self.create_bigint_pk_column(manager, EntityValues::Id)
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntityValues::EntityId).string().not_null())
                    .col(ColumnDef::new(EntityValues::Language).string().not_null())
                    .col(ColumnDef::new(EntityValues::Value).string().not_null())
                    .col(ColumnDef::new(EntityValues::Canonical).text().not_null())
                    .col(ColumnDef::new(EntityValues::Name).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entity_values_entity_id")
                            .from(EntityValues::Table, EntityValues::EntityId)
                            .to(EntityTypes::Table, EntityTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_string_types_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StringTypes::Table)
                    .if_not_exists()
                    .col(
                        self.create_bigint_pk_column(manager, StringTypes::Id)
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StringTypes::Language).string().not_null())
                    .col(ColumnDef::new(StringTypes::TypeName).string().not_null())
                    .col(ColumnDef::new(StringTypes::Name).string().not_null())
                    .col(ColumnDef::new(StringTypes::License).string().not_null())
                    .col(
                        ColumnDef::new(StringTypes::Attribution)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(self.create_timestamp_column(manager, StringTypes::CreatedAt))
                    .col(self.create_timestamp_column(manager, StringTypes::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_string_values_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StringValues::Table)
                    .if_not_exists()
                    .col(
                        self.create_bigint_pk_column(manager, StringValues::Id)
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StringValues::TypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StringValues::Value).text().not_null())
                    .col(ColumnDef::new(StringValues::Preprocessed).text().not_null())
                    .col(
                        ColumnDef::new(StringValues::Weight)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_string_values_type_id")
                            .from(StringValues::Table, StringValues::TypeId)
                            .to(StringTypes::Table, StringTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_examples_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Examples::Table)
                    .if_not_exists()
                    .col(
                        self.create_bigint_pk_column(manager, Examples::Id)
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Examples::Language).string().not_null())
                    .col(ColumnDef::new(Examples::Utterance).text().not_null())
                    .col(ColumnDef::new(Examples::Preprocessed).text().not_null())
                    .col(ColumnDef::new(Examples::TargetCode).text().not_null())
                    .col(
                        ColumnDef::new(Examples::ClickCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Examples::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Examples::Name).string())
                    .col(ColumnDef::new(Examples::Kind).string())
                    .col(self.create_timestamp_column(manager, Examples::CreatedAt))
                    .col(self.create_timestamp_column(manager, Examples::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // Entity values indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_entity_values_entity_language")
                    .table(EntityValues::Table)
                    .col(EntityValues::EntityId)
                    .col(EntityValues::Language)
                    .to_owned(),
            )
            .await?;

        // String types indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_string_types_language_type_name")
                    .table(StringTypes::Table)
                    .col(StringTypes::Language)
                    .col(StringTypes::TypeName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // String values indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_string_values_type_id")
                    .table(StringValues::Table)
                    .col(StringValues::TypeId)
                    .to_owned(),
            )
            .await?;

        // Examples indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_examples_language_kind")
                    .table(Examples::Table)
                    .col(Examples::Language)
                    .col(Examples::Kind)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_examples_language_click_count")
                    .table(Examples::Table)
                    .col(Examples::Language)
                    .col(Examples::ClickCount)
                    .to_owned(),
            )
            .await?;

        // Devices indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_devices_approved")
                    .table(Devices::Table)
                    .col(Devices::Approved)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    Id,
    PrimaryKind,
    Name,
    OwnerOrg,
    Factory,
    Approved,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EntityTypes {
    Table,
    Id,
    Language,
    Name,
    IsWellKnown,
    HasNerSupport,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EntityValues {
    Table,
    Id,
    EntityId,
    Language,
    Value,
    Canonical,
    Name,
}

#[derive(DeriveIden)]
enum StringTypes {
    Table,
    Id,
    Language,
    TypeName,
    Name,
    License,
    Attribution,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StringValues {
    Table,
    Id,
    TypeId,
    Value,
    Preprocessed,
    Weight,
}

#[derive(DeriveIden)]
enum Examples {
    Table,
    Id,
    Language,
    Utterance,
    Preprocessed,
    TargetCode,
    ClickCount,
    LikeCount,
    Name,
    Kind,
    CreatedAt,
    UpdatedAt,
}
