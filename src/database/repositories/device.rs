//! Device catalog repository
//!
//! Devices are the ownership anchor for uploads: an entity or string type with a
//! dotted id is owned by whichever device's `primary_kind` prefixes it. The
//! cheatsheet assembler also reads the approved catalog from here.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{devices, prelude::Devices};
use crate::models::Device;

/// Request payload for registering a device
#[derive(Debug, Clone)]
pub struct DeviceCreateRequest {
    pub primary_kind: String,
    pub name: String,
    pub owner_org: Option<i64>,
    pub factory: Option<String>,
    pub approved: bool,
}

/// SeaORM-based device repository
pub struct DeviceSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl DeviceSeaOrmRepository {
    /// Create a new device repository
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Register a new device
    pub async fn create(&self, request: DeviceCreateRequest) -> Result<Device> {
        let now = chrono::Utc::now();

        let active_model = devices::ActiveModel {
            primary_kind: Set(request.primary_kind),
            name: Set(request.name),
            owner_org: Set(request.owner_org),
            factory: Set(request.factory),
            approved: Set(request.approved),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    /// Find a device by its primary kind
    pub async fn find_by_kind(&self, kind: &str) -> Result<Option<Device>> {
        let model = Devices::find()
            .filter(devices::Column::PrimaryKind.eq(kind))
            .one(&*self.connection)
            .await?;

        Ok(model.map(Self::model_to_domain))
    }

    /// List every approved device, ordered by primary kind
    pub async fn find_all_approved(&self) -> Result<Vec<Device>> {
        let models = Devices::find()
            .filter(devices::Column::Approved.eq(true))
            .order_by_asc(devices::Column::PrimaryKind)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    fn model_to_domain(model: devices::Model) -> Device {
        Device {
            id: model.id,
            primary_kind: model.primary_kind,
            name: model.name,
            owner_org: model.owner_org,
            factory: model.factory,
            approved: model.approved,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    async fn create_test_db() -> Result<Arc<DatabaseConnection>> {
        let connection = sea_orm::Database::connect("sqlite::memory:").await?;
        let connection = Arc::new(connection);

        connection
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                r#"
            CREATE TABLE devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                primary_kind TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                owner_org INTEGER,
                factory TEXT,
                approved INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#
                .to_string(),
            ))
            .await?;

        Ok(connection)
    }

    #[tokio::test]
    async fn test_device_create_and_lookup() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = DeviceSeaOrmRepository::new(connection);

        let created = repo
            .create(DeviceCreateRequest {
                primary_kind: "com.example.light".to_string(),
                name: "Example Light".to_string(),
                owner_org: Some(7),
                factory: None,
                approved: true,
            })
            .await?;

        assert_eq!(created.primary_kind, "com.example.light");
        assert_eq!(created.owner_org, Some(7));

        let found = repo.find_by_kind("com.example.light").await?;
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, created.id);

        let missing = repo.find_by_kind("com.example.thermostat").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_find_all_approved_filters_and_orders() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = DeviceSeaOrmRepository::new(connection);

        for (kind, approved) in [
            ("org.example.zeta", true),
            ("org.example.alpha", true),
            ("org.example.draft", false),
        ] {
            repo.create(DeviceCreateRequest {
                primary_kind: kind.to_string(),
                name: kind.to_string(),
                owner_org: None,
                factory: Some("none".to_string()),
                approved,
            })
            .await?;
        }

        let approved = repo.find_all_approved().await?;
        let kinds: Vec<&str> = approved.iter().map(|d| d.primary_kind.as_str()).collect();
        assert_eq!(kinds, vec!["org.example.alpha", "org.example.zeta"]);

        Ok(())
    }
}
