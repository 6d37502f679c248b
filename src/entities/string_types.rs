use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "string_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub language: String,
    pub type_name: String,
    pub name: String,
    pub license: String,
    pub attribution: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::string_values::Entity")]
    StringValues,
}

impl Related<super::string_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StringValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
