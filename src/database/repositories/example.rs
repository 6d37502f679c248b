//! Example corpus repository
//!
//! Read paths feed the dataset compiler. `for_language` keeps insertion order so
//! duplicate merging stays first-appearance stable; the cheatsheet query orders by
//! popularity instead.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{examples, prelude::Examples};
use crate::models::RawExample;

/// Request payload for recording an example
#[derive(Debug, Clone)]
pub struct ExampleCreateRequest {
    pub language: String,
    pub utterance: String,
    pub preprocessed: String,
    pub target_code: String,
    pub click_count: i32,
    pub like_count: i32,
    pub name: Option<String>,
    pub kind: Option<String>,
}

/// SeaORM-based example repository
pub struct ExampleSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ExampleSeaOrmRepository {
    /// Create a new example repository
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Record a new example
    pub async fn create(&self, request: ExampleCreateRequest) -> Result<RawExample> {
        let now = chrono::Utc::now();

        let active_model = examples::ActiveModel {
            language: Set(request.language),
            utterance: Set(request.utterance),
            preprocessed: Set(request.preprocessed),
            target_code: Set(request.target_code),
            click_count: Set(request.click_count),
            like_count: Set(request.like_count),
            name: Set(request.name),
            kind: Set(request.kind),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    /// Load the whole corpus for a language in insertion order
    pub async fn for_language(&self, language: &str) -> Result<Vec<RawExample>> {
        let models = Examples::find()
            .filter(examples::Column::Language.eq(language))
            .order_by_asc(examples::Column::Id)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    /// Load the corpus for a language ordered by popularity, for the cheatsheet
    pub async fn cheatsheet_rows(&self, language: &str) -> Result<Vec<RawExample>> {
        let models = Examples::find()
            .filter(examples::Column::Language.eq(language))
            .order_by_desc(examples::Column::ClickCount)
            .order_by_asc(examples::Column::Id)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    fn model_to_domain(model: examples::Model) -> RawExample {
        RawExample {
            id: model.id,
            language: model.language,
            utterance: model.utterance,
            preprocessed: model.preprocessed,
            target_code: model.target_code,
            click_count: model.click_count,
            like_count: model.like_count,
            name: model.name,
            kind: model.kind,
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
            CREATE TABLE examples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                language TEXT NOT NULL,
                utterance TEXT NOT NULL,
                preprocessed TEXT NOT NULL,
                target_code TEXT NOT NULL,
                click_count INTEGER NOT NULL,
                like_count INTEGER NOT NULL,
                name TEXT,
                kind TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#
                .to_string(),
            ))
            .await?;

        Ok(connection)
    }

    fn request(utterance: &str, clicks: i32) -> ExampleCreateRequest {
        ExampleCreateRequest {
            language: "en".to_string(),
            utterance: utterance.to_string(),
            preprocessed: utterance.to_lowercase(),
            target_code: "query (@org.example.test.list());".to_string(),
            click_count: clicks,
            like_count: 0,
            name: None,
            kind: Some("org.example.test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_for_language_keeps_insertion_order() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = ExampleSeaOrmRepository::new(connection);

        repo.create(request("show the list", 5)).await?;
        repo.create(request("list everything", 20)).await?;
        repo.create(request("what is on the list", 1)).await?;

        let rows = repo.for_language("en").await?;
        let utterances: Vec<&str> = rows.iter().map(|r| r.utterance.as_str()).collect();
        assert_eq!(
            utterances,
            vec!["show the list", "list everything", "what is on the list"]
        );

        assert!(repo.for_language("it").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_cheatsheet_rows_order_by_clicks() -> Result<()> {
        let connection = create_test_db().await?;
        let repo = ExampleSeaOrmRepository::new(connection);

        repo.create(request("show the list", 5)).await?;
        repo.create(request("list everything", 20)).await?;
        repo.create(request("what is on the list", 5)).await?;

        let rows = repo.cheatsheet_rows("en").await?;
        let utterances: Vec<&str> = rows.iter().map(|r| r.utterance.as_str()).collect();
        assert_eq!(
            utterances,
            vec!["list everything", "show the list", "what is on the list"]
        );

        Ok(())
    }
}
