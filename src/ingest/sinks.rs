//! Row sinks that write decoded upload rows inside the caller's transaction.
//!
//! Both sinks borrow the open [`DatabaseTransaction`] so every insert is part
//! of the same replace-on-conflict unit as the metadata upsert and the value
//! purge that precede the pipeline run.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use std::sync::Arc;

use super::pipeline::{RowSink, SinkReport};
use super::row::RowNormalizer;
use crate::database::repositories::entity::EntityValueInsert;
use crate::database::repositories::{EntitySeaOrmRepository, StringTypeSeaOrmRepository};
use crate::errors::AppResult;
use crate::i18n::Tokenizer;
use crate::models::NormalizedValue;

/// Sink for entity value CSV rows: `value,name`.
///
/// Rows of any other width are counted as skipped. The canonical form is the
/// tokenized display name, which is what lookup matches against at runtime.
pub struct EntityValueSink<'a> {
    repository: &'a EntitySeaOrmRepository,
    txn: &'a DatabaseTransaction,
    entity_id: String,
    language: String,
    tokenizer: Arc<dyn Tokenizer>,
    batch: Vec<EntityValueInsert>,
    batch_size: usize,
    rows_written: u64,
    rows_skipped: u64,
}

impl<'a> EntityValueSink<'a> {
    pub fn new(
        repository: &'a EntitySeaOrmRepository,
        txn: &'a DatabaseTransaction,
        entity_id: impl Into<String>,
        language: impl Into<String>,
        tokenizer: Arc<dyn Tokenizer>,
        batch_size: usize,
    ) -> Self {
        Self {
            repository,
            txn,
            entity_id: entity_id.into(),
            language: language.into(),
            tokenizer,
            batch: Vec::new(),
            batch_size: batch_size.max(1),
            rows_written: 0,
            rows_skipped: 0,
        }
    }

    async fn flush(&mut self) -> AppResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.batch);
        self.repository
            .insert_values(self.txn, &self.entity_id, &self.language, rows)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RowSink for EntityValueSink<'_> {
    async fn accept(&mut self, row: Vec<String>) -> AppResult<()> {
        if row.len() != 2 {
            self.rows_skipped += 1;
            return Ok(());
        }

        let value = row[0].trim().to_string();
        let name = row[1].clone();
        let canonical = self.tokenizer.tokenize(&name).joined();

        self.batch.push(EntityValueInsert {
            value,
            canonical,
            name,
        });
        self.rows_written += 1;

        if self.batch.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    async fn finish(&mut self) -> AppResult<SinkReport> {
        self.flush().await?;
        Ok(SinkReport {
            rows_written: self.rows_written,
            rows_skipped: self.rows_skipped,
        })
    }
}

/// Sink for string value TSV rows, normalized through [`RowNormalizer`].
pub struct StringValueSink<'a> {
    repository: &'a StringTypeSeaOrmRepository,
    txn: &'a DatabaseTransaction,
    type_id: i64,
    normalizer: RowNormalizer,
    batch: Vec<NormalizedValue>,
    batch_size: usize,
    rows_written: u64,
    rows_skipped: u64,
}

impl<'a> StringValueSink<'a> {
    pub fn new(
        repository: &'a StringTypeSeaOrmRepository,
        txn: &'a DatabaseTransaction,
        type_id: i64,
        normalizer: RowNormalizer,
        batch_size: usize,
    ) -> Self {
        Self {
            repository,
            txn,
            type_id,
            normalizer,
            batch: Vec::new(),
            batch_size: batch_size.max(1),
            rows_written: 0,
            rows_skipped: 0,
        }
    }

    async fn flush(&mut self) -> AppResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.batch);
        self.repository
            .insert_values(self.txn, self.type_id, rows)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RowSink for StringValueSink<'_> {
    async fn accept(&mut self, row: Vec<String>) -> AppResult<()> {
        match self.normalizer.normalize(&row) {
            Some(value) => {
                self.batch.push(value);
                self.rows_written += 1;
                if self.batch.len() >= self.batch_size {
                    self.flush().await?;
                }
            }
            None => self.rows_skipped += 1,
        }
        Ok(())
    }

    async fn finish(&mut self) -> AppResult<SinkReport> {
        self.flush().await?;
        Ok(SinkReport {
            rows_written: self.rows_written,
            rows_skipped: self.rows_skipped,
        })
    }
}
