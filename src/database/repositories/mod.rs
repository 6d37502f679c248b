//! SeaORM repository implementations
//!
//! This module provides repository implementations using SeaORM that work across
//! SQLite, PostgreSQL, and MySQL databases. Write methods that participate in the
//! upload transaction take an explicit `DatabaseTransaction` so the service layer
//! can keep a whole replace-on-conflict upload atomic.

pub mod device;
pub mod entity;
pub mod example;
pub mod string_type;

// Re-export for convenience
pub use device::DeviceSeaOrmRepository;
pub use entity::EntitySeaOrmRepository;
pub use example::ExampleSeaOrmRepository;
pub use string_type::StringTypeSeaOrmRepository;
