use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_types")]
pub struct Model {
    /// Natural key in `prefix:suffix` form
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub language: String,
    pub name: String,
    pub is_well_known: bool,
    pub has_ner_support: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entity_values::Entity")]
    EntityValues,
}

impl Related<super::entity_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntityValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
