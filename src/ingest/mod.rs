//! Streaming upload ingestion
//!
//! This service owns the two tabular upload flows: entity value CSVs and
//! string dataset TSVs. Each upload runs as a single transaction that upserts
//! the parent record, purges its previous value set and streams the new rows
//! in through the decode pipeline, so a failure anywhere leaves the previous
//! value set untouched.

pub mod decode;
pub mod pipeline;
pub mod row;
pub mod sinks;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::config::IngestionConfig;
use crate::database::repositories::entity::EntityTypeUpsert;
use crate::database::repositories::string_type::StringTypeUpsert;
use crate::database::repositories::{
    DeviceSeaOrmRepository, EntitySeaOrmRepository, StringTypeSeaOrmRepository,
};
use crate::errors::{AppError, AppResult};
use crate::i18n::{locale_to_language, Tokenizer, TokenizerRegistry};
use crate::lang::parse_qualified_id;
use crate::models::{License, Uploader};

use decode::DecodeFormat;
use row::RowNormalizer;
use sinks::{EntityValueSink, StringValueSink};

/// Form fields of an entity value upload.
#[derive(Debug, Clone)]
pub struct EntityUploadRequest {
    pub entity_id: String,
    pub entity_name: String,
    pub no_ner_support: bool,
    pub locale: Option<String>,
}

/// Form fields of a string dataset upload.
#[derive(Debug, Clone)]
pub struct StringUploadRequest {
    pub type_name: String,
    pub name: String,
    pub license: String,
    pub attribution: Option<String>,
    pub preprocessed: bool,
    pub locale: Option<String>,
}

/// What a completed upload did, returned to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadSummary {
    pub id: String,
    pub language: String,
    pub rows_decoded: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
}

/// Service for ingesting uploaded tabular value files
pub struct UploadService {
    connection: Arc<DatabaseConnection>,
    devices: DeviceSeaOrmRepository,
    entities: EntitySeaOrmRepository,
    strings: StringTypeSeaOrmRepository,
    tokenizers: Arc<TokenizerRegistry>,
    ingestion: IngestionConfig,
}

impl UploadService {
    pub fn new(
        connection: Arc<DatabaseConnection>,
        tokenizers: Arc<TokenizerRegistry>,
        ingestion: IngestionConfig,
    ) -> Self {
        let devices = DeviceSeaOrmRepository::new(connection.clone());
        let entities = EntitySeaOrmRepository::new(connection.clone());
        let strings = StringTypeSeaOrmRepository::new(connection.clone());
        Self {
            connection,
            devices,
            entities,
            strings,
            tokenizers,
            ingestion,
        }
    }

    /// Upsert an entity type and replace its value set from a CSV file.
    ///
    /// Rows are `value,name` pairs; the file may be absent when
    /// `no_ner_support` is set, in which case only the metadata is written.
    pub async fn upload_entities(
        &self,
        uploader: &Uploader,
        request: EntityUploadRequest,
        file: Option<&Path>,
    ) -> AppResult<UploadSummary> {
        let language = locale_to_language(request.locale.as_deref()).to_string();
        let tokenizer = self.tokenizers.for_language(&language);

        let Some((prefix, _)) = parse_qualified_id(&request.entity_id) else {
            return Err(AppError::invalid_input("Invalid entity type ID."));
        };
        self.check_upload_authorization(uploader, prefix, "entity")
            .await?;

        let txn = self.connection.begin().await?;
        match self
            .replace_entity_values(&txn, &request, file, &language, tokenizer)
            .await
        {
            Ok(summary) => {
                txn.commit().await?;
                info!(
                    "Replaced entity values for {} ({}): {} written, {} skipped",
                    summary.id, summary.language, summary.rows_written, summary.rows_skipped
                );
                Ok(summary)
            }
            Err(upload_error) => {
                if let Err(e) = txn.rollback().await {
                    error!("Failed to roll back entity upload transaction: {}", e);
                }
                Err(upload_error)
            }
        }
    }

    async fn replace_entity_values(
        &self,
        txn: &DatabaseTransaction,
        request: &EntityUploadRequest,
        file: Option<&Path>,
        language: &str,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> AppResult<UploadSummary> {
        let mut upsert = EntityTypeUpsert {
            id: request.entity_id.clone(),
            language: language.to_string(),
            name: request.entity_name.clone(),
            is_well_known: false,
            has_ner_support: !request.no_ner_support,
        };

        match self.entities.find_by_id(txn, &request.entity_id).await? {
            Some(existing) => {
                // A display name equal to the id means the uploader left it
                // blank; keep the name already on record.
                if upsert.name == upsert.id {
                    upsert.name = existing.name;
                }
                self.entities.update(txn, upsert).await?;
                self.entities
                    .delete_values(txn, &request.entity_id, language)
                    .await?;
            }
            None => {
                self.entities.create(txn, upsert).await?;
            }
        }

        // Non-NER entities carry no value list; the metadata write is all
        // there is to do, and any attached file is ignored.
        if request.no_ner_support {
            return Ok(UploadSummary {
                id: request.entity_id.clone(),
                language: language.to_string(),
                rows_decoded: 0,
                rows_written: 0,
                rows_skipped: 0,
            });
        }

        let Some(path) = file else {
            return Err(AppError::invalid_input(
                "You must upload a CSV file with the entity values.",
            ));
        };

        let mut sink = EntityValueSink::new(
            &self.entities,
            txn,
            request.entity_id.as_str(),
            language,
            tokenizer,
            self.ingestion.insert_batch_size,
        );
        let report =
            pipeline::run(&self.ingestion, path, DecodeFormat::entity_csv(), &mut sink).await?;

        Ok(UploadSummary {
            id: request.entity_id.clone(),
            language: language.to_string(),
            rows_decoded: report.rows_decoded,
            rows_written: report.rows_written,
            rows_skipped: report.rows_skipped,
        })
    }

    /// Upsert a string type and replace its value set from a TSV file.
    pub async fn upload_string_dataset(
        &self,
        uploader: &Uploader,
        request: StringUploadRequest,
        file: Option<&Path>,
    ) -> AppResult<UploadSummary> {
        let language = locale_to_language(request.locale.as_deref()).to_string();

        let Some((prefix, _)) = parse_qualified_id(&request.type_name) else {
            return Err(AppError::invalid_input("Invalid string type ID."));
        };
        let license = request
            .license
            .parse::<License>()
            .map_err(|_| AppError::invalid_input("Invalid license."))?;

        self.check_upload_authorization(uploader, prefix, "dataset")
            .await?;

        let Some(path) = file else {
            return Err(AppError::invalid_input(
                "You must upload a TSV file with the string values.",
            ));
        };

        let txn = self.connection.begin().await?;
        match self
            .replace_string_values(&txn, &request, license, path, &language)
            .await
        {
            Ok(summary) => {
                txn.commit().await?;
                info!(
                    "Replaced string values for {} ({}): {} written, {} skipped",
                    summary.id, summary.language, summary.rows_written, summary.rows_skipped
                );
                Ok(summary)
            }
            Err(upload_error) => {
                if let Err(e) = txn.rollback().await {
                    error!("Failed to roll back string upload transaction: {}", e);
                }
                Err(upload_error)
            }
        }
    }

    async fn replace_string_values(
        &self,
        txn: &DatabaseTransaction,
        request: &StringUploadRequest,
        license: License,
        path: &Path,
        language: &str,
    ) -> AppResult<UploadSummary> {
        let mut upsert = StringTypeUpsert {
            language: language.to_string(),
            type_name: request.type_name.clone(),
            name: request.name.clone(),
            license,
            attribution: request.attribution.clone().unwrap_or_default(),
        };

        let type_id = match self
            .strings
            .get_by_type_name(txn, language, &request.type_name)
            .await?
        {
            Some(existing) => {
                // Re-uploading as public-domain never downgrades a stated
                // license, and blank metadata keeps what is on record.
                if upsert.license == License::PublicDomain {
                    upsert.license = existing.license;
                }
                if upsert.attribution.is_empty() {
                    upsert.attribution = existing.attribution;
                }
                if upsert.name == upsert.type_name {
                    upsert.name = existing.name;
                }
                self.strings.update(txn, existing.id, upsert).await?;
                self.strings.delete_values(txn, existing.id).await?;
                existing.id
            }
            None => self.strings.create(txn, upsert).await?.id,
        };

        let tokenizer = self.tokenizers.for_language(language);
        let normalizer = RowNormalizer::new(tokenizer, request.preprocessed);
        let mut sink = StringValueSink::new(
            &self.strings,
            txn,
            type_id,
            normalizer,
            self.ingestion.insert_batch_size,
        );
        let report =
            pipeline::run(&self.ingestion, path, DecodeFormat::string_tsv(), &mut sink).await?;

        Ok(UploadSummary {
            id: request.type_name.clone(),
            language: language.to_string(),
            rows_decoded: report.rows_decoded,
            rows_written: report.rows_written,
            rows_skipped: report.rows_skipped,
        })
    }

    /// Admins may upload under any prefix; everyone else must own the device
    /// whose kind matches the identifier prefix.
    async fn check_upload_authorization(
        &self,
        uploader: &Uploader,
        prefix: &str,
        what: &str,
    ) -> AppResult<()> {
        if uploader.admin {
            return Ok(());
        }

        let device = self.devices.find_by_kind(prefix).await?;
        let allowed = device.is_some_and(|d| d.owner_org == uploader.org);
        if !allowed {
            return Err(AppError::forbidden(format!(
                "The prefix of the {what} ID must correspond to the ID of a device owned by your organization."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::device::DeviceCreateRequest;
    use anyhow::Result;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
    use std::io::Write;

    async fn create_test_db() -> Result<Arc<DatabaseConnection>> {
        let connection = sea_orm::Database::connect("sqlite::memory:").await?;
        let connection = Arc::new(connection);

        for ddl in [
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
            "#,
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
            "#,
            r#"
            CREATE TABLE entity_values (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_id TEXT NOT NULL,
                language TEXT NOT NULL,
                value TEXT NOT NULL,
                canonical TEXT NOT NULL,
                name TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE string_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                language TEXT NOT NULL,
                type_name TEXT NOT NULL,
                name TEXT NOT NULL,
                license TEXT NOT NULL,
                attribution TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE string_values (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_id INTEGER NOT NULL,
                value TEXT NOT NULL,
                preprocessed TEXT NOT NULL,
                weight REAL NOT NULL
            );
            "#,
        ] {
            connection
                .execute(Statement::from_string(
                    DatabaseBackend::Sqlite,
                    ddl.to_string(),
                ))
                .await?;
        }

        Ok(connection)
    }

    fn service(connection: Arc<DatabaseConnection>) -> UploadService {
        UploadService::new(
            connection,
            Arc::new(TokenizerRegistry::default()),
            IngestionConfig::default(),
        )
    }

    fn admin() -> Uploader {
        Uploader {
            admin: true,
            org: None,
        }
    }

    fn entity_request(id: &str, name: &str) -> EntityUploadRequest {
        EntityUploadRequest {
            entity_id: id.to_string(),
            entity_name: name.to_string(),
            no_ner_support: false,
            locale: Some("en-US".to_string()),
        }
    }

    fn string_request(type_name: &str, name: &str, license: &str) -> StringUploadRequest {
        StringUploadRequest {
            type_name: type_name.to_string(),
            name: name.to_string(),
            license: license.to_string(),
            attribution: None,
            preprocessed: false,
            locale: Some("en-US".to_string()),
        }
    }

    fn spool(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_entity_upload_replaces_values() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection.clone());

        let file = spool("red,Bright Red\nblue,Deep Blue\n");
        let summary = upload
            .upload_entities(
                &admin(),
                entity_request("com.example:color", "Color"),
                Some(file.path()),
            )
            .await
            .unwrap();
        assert_eq!(summary.language, "en");
        assert_eq!(summary.rows_written, 2);

        // A second upload replaces the first value set entirely.
        let file = spool("green,Green\n");
        let summary = upload
            .upload_entities(
                &admin(),
                entity_request("com.example:color", "com.example:color"),
                Some(file.path()),
            )
            .await
            .unwrap();
        assert_eq!(summary.rows_written, 1);

        let values = upload
            .entities
            .values_for_entity("com.example:color", "en")
            .await?;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "green");

        // The second upload passed the id as the name, so the display name
        // from the first upload survives.
        let txn = connection.begin().await?;
        let entity = upload
            .entities
            .find_by_id(&txn, "com.example:color")
            .await?
            .unwrap();
        assert_eq!(entity.name, "Color");
        txn.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_entity_upload_rejects_malformed_id() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        let result = upload
            .upload_entities(&admin(), entity_request("not a valid id", "Color"), None)
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_entity_upload_requires_file_for_ner_entities() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        let result = upload
            .upload_entities(&admin(), entity_request("com.example:color", "Color"), None)
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_ner_entity_skips_the_file() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection.clone());

        let mut request = entity_request("com.example:opaque", "Opaque Token");
        request.no_ner_support = true;
        let summary = upload.upload_entities(&admin(), request, None).await.unwrap();
        assert_eq!(summary.rows_decoded, 0);

        let txn = connection.begin().await?;
        let entity = upload
            .entities
            .find_by_id(&txn, "com.example:opaque")
            .await?
            .unwrap();
        assert!(!entity.has_ner_support);
        txn.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_authorization_requires_owned_device() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        upload
            .devices
            .create(DeviceCreateRequest {
                primary_kind: "com.example".to_string(),
                name: "Example Gadget".to_string(),
                owner_org: Some(7),
                factory: None,
                approved: true,
            })
            .await?;

        let outsider = Uploader {
            admin: false,
            org: Some(8),
        };
        let result = upload
            .upload_entities(
                &outsider,
                entity_request("com.example:color", "Color"),
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden { .. })));

        let owner = Uploader {
            admin: false,
            org: Some(7),
        };
        let file = spool("red,Red\n");
        let summary = upload
            .upload_entities(
                &owner,
                entity_request("com.example:color", "Color"),
                Some(file.path()),
            )
            .await
            .unwrap();
        assert_eq!(summary.rows_written, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_decode_error_rolls_back_the_replacement() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        let file = spool("red,Red\n");
        upload
            .upload_entities(
                &admin(),
                entity_request("com.example:color", "Color"),
                Some(file.path()),
            )
            .await
            .unwrap();

        // Strict CSV rejects the ragged second row; the transaction rolls
        // back and the earlier values survive.
        let file = spool("green,Green\noops,too,many\n");
        let result = upload
            .upload_entities(
                &admin(),
                entity_request("com.example:color", "Color"),
                Some(file.path()),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput { .. })));

        let values = upload
            .entities
            .values_for_entity("com.example:color", "en")
            .await?;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "red");
        Ok(())
    }

    #[tokio::test]
    async fn test_string_upload_license_and_name_fallbacks() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        let file = spool("hello there\ngood morning\t2.0\n");
        let summary = upload
            .upload_string_dataset(
                &admin(),
                StringUploadRequest {
                    attribution: Some("Example Corpus".to_string()),
                    ..string_request("com.example:greeting", "Greetings", "free-permissive")
                },
                Some(file.path()),
            )
            .await
            .unwrap();
        assert_eq!(summary.rows_written, 2);

        // Re-upload as public-domain with a blank name: both fall back to the
        // record already present.
        let file = spool("howdy\n");
        upload
            .upload_string_dataset(
                &admin(),
                string_request(
                    "com.example:greeting",
                    "com.example:greeting",
                    "public-domain",
                ),
                Some(file.path()),
            )
            .await
            .unwrap();

        let stored = upload
            .strings
            .find_by_type_name("en", "com.example:greeting")
            .await?
            .unwrap();
        assert_eq!(stored.license, License::FreePermissive);
        assert_eq!(stored.name, "Greetings");
        assert_eq!(stored.attribution, "Example Corpus");

        let values = upload.strings.values_for_type(stored.id).await?;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "howdy");
        Ok(())
    }

    #[tokio::test]
    async fn test_string_upload_rejects_unknown_license() -> Result<()> {
        let connection = create_test_db().await?;
        let upload = service(connection);

        let file = spool("hello\n");
        let result = upload
            .upload_string_dataset(
                &admin(),
                string_request("com.example:greeting", "Greetings", "sharealike"),
                Some(file.path()),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput { .. })));
        Ok(())
    }
}
