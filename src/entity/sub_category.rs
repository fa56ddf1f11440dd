//! Monitoring sub-category lookup row.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "SubCategories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub main_category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::main_category::Entity",
        from = "Column::MainCategoryId",
        to = "super::main_category::Column::Id"
    )]
    MainCategory,
}

impl Related<super::main_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MainCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
