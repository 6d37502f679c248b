//! String type repository
//!
//! String types are keyed by `(language, type_name)` with a surrogate bigint id
//! that the value rows point at. Value writes take the caller's transaction for
//! the same reason the entity repository does: one upload, one atomic replace.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{prelude::*, string_types, string_values};
use crate::models::{License, NormalizedValue, StringType, StringValue};

/// Payload for creating or updating a string type record
#[derive(Debug, Clone)]
pub struct StringTypeUpsert {
    pub language: String,
    pub type_name: String,
    pub name: String,
    pub license: License,
    pub attribution: String,
}

/// SeaORM-based string type repository
pub struct StringTypeSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StringTypeSeaOrmRepository {
    /// Create a new string type repository
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Find a string type by language and type name, inside the upload transaction
    pub async fn get_by_type_name(
        &self,
        txn: &DatabaseTransaction,
        language: &str,
        type_name: &str,
    ) -> Result<Option<StringType>> {
        let model = StringTypes::find()
            .filter(string_types::Column::Language.eq(language))
            .filter(string_types::Column::TypeName.eq(type_name))
            .one(txn)
            .await?;

        model.map(Self::model_to_domain).transpose()
    }

    /// Create a new string type record
    pub async fn create(
        &self,
        txn: &DatabaseTransaction,
        request: StringTypeUpsert,
    ) -> Result<StringType> {
        let now = chrono::Utc::now();

        let active_model = string_types::ActiveModel {
            language: Set(request.language),
            type_name: Set(request.type_name),
            name: Set(request.name),
            license: Set(request.license.to_string()),
            attribution: Set(request.attribution),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(txn).await?;
        Self::model_to_domain(model)
    }

    /// Update an existing string type record
    pub async fn update(
        &self,
        txn: &DatabaseTransaction,
        id: i64,
        request: StringTypeUpsert,
    ) -> Result<StringType> {
        let model = StringTypes::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("String type not found: {}", id))?;

        let mut active_model: string_types::ActiveModel = model.into();
        active_model.language = Set(request.language);
        active_model.type_name = Set(request.type_name);
        active_model.name = Set(request.name);
        active_model.license = Set(request.license.to_string());
        active_model.attribution = Set(request.attribution);
        active_model.updated_at = Set(chrono::Utc::now());

        let updated = active_model.update(txn).await?;
        Self::model_to_domain(updated)
    }

    /// Delete the value set an upload is about to replace
    pub async fn delete_values(&self, txn: &DatabaseTransaction, type_id: i64) -> Result<u64> {
        let result = StringValues::delete_many()
            .filter(string_values::Column::TypeId.eq(type_id))
            .exec(txn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Bulk-insert a batch of normalized string values
    pub async fn insert_values(
        &self,
        txn: &DatabaseTransaction,
        type_id: i64,
        rows: Vec<NormalizedValue>,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let active_models: Vec<string_values::ActiveModel> = rows
            .into_iter()
            .map(|row| string_values::ActiveModel {
                type_id: Set(type_id),
                value: Set(row.value),
                preprocessed: Set(row.preprocessed),
                weight: Set(row.weight),
                ..Default::default()
            })
            .collect();

        StringValues::insert_many(active_models).exec(txn).await?;
        Ok(())
    }

    /// List every string type registered for a language
    pub async fn list_for_language(&self, language: &str) -> Result<Vec<StringType>> {
        let models = StringTypes::find()
            .filter(string_types::Column::Language.eq(language))
            .order_by_asc(string_types::Column::TypeName)
            .all(&*self.connection)
            .await?;

        models.into_iter().map(Self::model_to_domain).collect()
    }

    /// Find a string type outside any transaction, for the read endpoints
    pub async fn find_by_type_name(
        &self,
        language: &str,
        type_name: &str,
    ) -> Result<Option<StringType>> {
        let model = StringTypes::find()
            .filter(string_types::Column::Language.eq(language))
            .filter(string_types::Column::TypeName.eq(type_name))
            .one(&*self.connection)
            .await?;

        model.map(Self::model_to_domain).transpose()
    }

    /// Read back the stored values for a string type
    pub async fn values_for_type(&self, type_id: i64) -> Result<Vec<StringValue>> {
        let models = StringValues::find()
            .filter(string_values::Column::TypeId.eq(type_id))
            .order_by_asc(string_values::Column::Id)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::value_to_domain).collect())
    }

    fn model_to_domain(model: string_types::Model) -> Result<StringType> {
        let license = model.license.parse::<License>().map_err(|_| {
            anyhow::anyhow!(
                "Unknown license stored for string type {}: {}",
                model.id,
                model.license
            )
        })?;

        Ok(StringType {
            id: model.id,
            language: model.language,
            type_name: model.type_name,
            name: model.name,
            license,
            attribution: model.attribution,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn value_to_domain(model: string_values::Model) -> StringValue {
        StringValue {
            id: model.id,
            type_id: model.type_id,
            value: model.value,
            preprocessed: model.preprocessed,
            weight: model.weight,
        }
    }
}
