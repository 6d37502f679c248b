//! SeaORM entity definitions for the corpus-forge schema

pub mod devices;
pub mod entity_types;
pub mod entity_values;
pub mod examples;
pub mod prelude;
pub mod string_types;
pub mod string_values;
