//! Calendar year lookup row.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "Years")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub year: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::period::Entity")]
    Periods,
}

impl Related<super::period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
