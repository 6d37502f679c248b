//! Entity type repository
//!
//! Entity types use their dotted `prefix:name` identifier as the primary key, so
//! there is no surrogate id to juggle. Value writes run against the caller's
//! transaction: an upload replaces the value set and must roll back as one unit.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{entity_types, entity_values, prelude::*};
use crate::models::{EntityType, EntityValue};

/// Payload for creating or updating an entity type record
#[derive(Debug, Clone)]
pub struct EntityTypeUpsert {
    pub id: String,
    pub language: String,
    pub name: String,
    pub is_well_known: bool,
    pub has_ner_support: bool,
}

/// A single value row staged for bulk insertion
#[derive(Debug, Clone)]
pub struct EntityValueInsert {
    pub value: String,
    pub canonical: String,
    pub name: String,
}

/// SeaORM-based entity type repository
pub struct EntitySeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl EntitySeaOrmRepository {
    /// Create a new entity repository
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Find an entity type by its dotted identifier, inside the upload transaction
    pub async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> Result<Option<EntityType>> {
        let model = EntityTypes::find_by_id(id).one(txn).await?;
        Ok(model.map(Self::model_to_domain))
    }

    /// Create a new entity type record
    pub async fn create(
        &self,
        txn: &DatabaseTransaction,
        request: EntityTypeUpsert,
    ) -> Result<EntityType> {
        let now = chrono::Utc::now();

        let active_model = entity_types::ActiveModel {
            id: Set(request.id),
            language: Set(request.language),
            name: Set(request.name),
            is_well_known: Set(request.is_well_known),
            has_ner_support: Set(request.has_ner_support),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(txn).await?;
        Ok(Self::model_to_domain(model))
    }

    /// Update an existing entity type record
    pub async fn update(
        &self,
        txn: &DatabaseTransaction,
        request: EntityTypeUpsert,
    ) -> Result<EntityType> {
        let model = EntityTypes::find_by_id(request.id.as_str())
            .one(txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Entity type not found: {}", request.id))?;

        let mut active_model: entity_types::ActiveModel = model.into();
        active_model.language = Set(request.language);
        active_model.name = Set(request.name);
        active_model.is_well_known = Set(request.is_well_known);
        active_model.has_ner_support = Set(request.has_ner_support);
        active_model.updated_at = Set(chrono::Utc::now());

        let updated = active_model.update(txn).await?;
        Ok(Self::model_to_domain(updated))
    }

    /// Delete the value set an upload is about to replace
    pub async fn delete_values(
        &self,
        txn: &DatabaseTransaction,
        entity_id: &str,
        language: &str,
    ) -> Result<u64> {
        let result = EntityValues::delete_many()
            .filter(entity_values::Column::EntityId.eq(entity_id))
            .filter(entity_values::Column::Language.eq(language))
            .exec(txn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Bulk-insert a batch of entity values
    pub async fn insert_values(
        &self,
        txn: &DatabaseTransaction,
        entity_id: &str,
        language: &str,
        rows: Vec<EntityValueInsert>,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let active_models: Vec<entity_values::ActiveModel> = rows
            .into_iter()
            .map(|row| entity_values::ActiveModel {
                entity_id: Set(entity_id.to_string()),
                language: Set(language.to_string()),
                value: Set(row.value),
                canonical: Set(row.canonical),
                name: Set(row.name),
                ..Default::default()
            })
            .collect();

        EntityValues::insert_many(active_models).exec(txn).await?;
        Ok(())
    }

    /// Read back the stored values for an entity in one language
    pub async fn values_for_entity(
        &self,
        entity_id: &str,
        language: &str,
    ) -> Result<Vec<EntityValue>> {
        let models = EntityValues::find()
            .filter(entity_values::Column::EntityId.eq(entity_id))
            .filter(entity_values::Column::Language.eq(language))
            .order_by_asc(entity_values::Column::Id)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::value_to_domain).collect())
    }

    fn model_to_domain(model: entity_types::Model) -> EntityType {
        EntityType {
            id: model.id,
            language: model.language,
            name: model.name,
            is_well_known: model.is_well_known,
            has_ner_support: model.has_ner_support,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn value_to_domain(model: entity_values::Model) -> EntityValue {
        EntityValue {
            id: model.id,
            entity_id: model.entity_id,
            language: model.language,
            value: model.value,
            canonical: model.canonical,
            name: model.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};

    async fn create_test_db() -> Result<Arc<DatabaseConnection>> {
        let connection = sea_orm::Database::connect("sqlite::memory:").await?;
        let connection = Arc::new(connection);

        connection
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                r#"
            CREATE TABLE entity_types (
                id TEXT PRIMARY KEY,
                language TEXT NOT NULL,
                name TEXT NOT NULL,
                is_well_known INTEGER NOT NULL,
                has_ner_support INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#
                .to_string(),
            ))
            .await?;

        connection
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                r#"
            CREATE TABLE entity_values (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_id TEXT NOT NULL,
                language TEXT NOT NULL,
                value TEXT NOT NULL,
                canonical TEXT NOT NULL,
                name TEXT NOT NULL
            );
            "#
                .to_string(),
            ))
            .await?;

        Ok(connection)
    }

    fn upsert(id: &str, name: &str) -> EntityTypeUpsert {
        EntityTypeUpsert {
            id: id.to_string(),
            language: "en".to_string(),
            name: name.to_string(),
            is_well_known: false,
            has_ner_support: true,
        }
    }

    #[tokio::test]
    async fn test_entity_type_create_update() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = EntitySeaOrmRepository::new(connection.clone());

        let txn = connection.begin().await?;
        let created = repo
            .create(&txn, upsert("com.example:color", "Color"))
            .await?;
        assert_eq!(created.id, "com.example:color");
        assert_eq!(created.name, "Color");

        let found = repo.find_by_id(&txn, "com.example:color").await?;
        assert!(found.is_some());

        let updated = repo
            .update(&txn, upsert("com.example:color", "Paint Color"))
            .await?;
        assert_eq!(updated.name, "Paint Color");
        txn.commit().await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_values_replaced_per_language() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = EntitySeaOrmRepository::new(connection.clone());

        let txn = connection.begin().await?;
        repo.create(&txn, upsert("com.example:color", "Color"))
            .await?;
        repo.insert_values(
            &txn,
            "com.example:color",
            "en",
            vec![
                EntityValueInsert {
                    value: "red".to_string(),
                    canonical: "red".to_string(),
                    name: "Red".to_string(),
                },
                EntityValueInsert {
                    value: "blue".to_string(),
                    canonical: "blue".to_string(),
                    name: "Blue".to_string(),
                },
            ],
        )
        .await?;
        repo.insert_values(
            &txn,
            "com.example:color",
            "it",
            vec![EntityValueInsert {
                value: "red".to_string(),
                canonical: "rosso".to_string(),
                name: "Rosso".to_string(),
            }],
        )
        .await?;
        txn.commit().await?;

        let txn = connection.begin().await?;
        let deleted = repo.delete_values(&txn, "com.example:color", "en").await?;
        assert_eq!(deleted, 2);
        repo.insert_values(
            &txn,
            "com.example:color",
            "en",
            vec![EntityValueInsert {
                value: "green".to_string(),
                canonical: "green".to_string(),
                name: "Green".to_string(),
            }],
        )
        .await?;
        txn.commit().await?;

        let english = repo.values_for_entity("com.example:color", "en").await?;
        assert_eq!(english.len(), 1);
        assert_eq!(english[0].value, "green");

        // The other language's values survive the replacement.
        let italian = repo.values_for_entity("com.example:color", "it").await?;
        assert_eq!(italian.len(), 1);
        assert_eq!(italian[0].canonical, "rosso");

        Ok(())
    }
}
