use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "examples")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub language: String,
    #[sea_orm(column_type = "Text")]
    pub utterance: String,
    #[sea_orm(column_type = "Text")]
    pub preprocessed: String,
    #[sea_orm(column_type = "Text")]
    pub target_code: String,
    pub click_count: i32,
    pub like_count: i32,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
