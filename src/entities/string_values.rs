use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "string_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub type_id: i64,
    pub value: String,
    pub preprocessed: String,
    pub weight: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::string_types::Entity",
        from = "Column::TypeId",
        to = "super::string_types::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    StringTypes,
}

impl Related<super::string_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StringTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
