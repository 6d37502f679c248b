pub use super::devices::Entity as Devices;
pub use super::entity_types::Entity as EntityTypes;
pub use super::entity_values::Entity as EntityValues;
pub use super::examples::Entity as Examples;
pub use super::string_types::Entity as StringTypes;
pub use super::string_values::Entity as StringValues;
