use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub entity_id: String,
    pub language: String,
    pub value: String,
    pub canonical: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entity_types::Entity",
        from = "Column::EntityId",
        to = "super::entity_types::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    EntityTypes,
}

impl Related<super::entity_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntityTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
