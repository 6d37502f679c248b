/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./corpus-forge.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Storage defaults
pub const DEFAULT_UPLOAD_PATH: &str = "./data/uploads";

// Ingestion defaults
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 500;

// I18n defaults
pub const DEFAULT_LOCALE: &str = "en-US";

// Dataset compilation defaults
pub const DEFAULT_DATASET_NAME: &str = "everything";
