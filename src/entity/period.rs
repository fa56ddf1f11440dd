//! Reporting period lookup row.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "Periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub period_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub year_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::year::Entity",
        from = "Column::YearId",
        to = "super::year::Column::Id"
    )]
    Year,
}

impl Related<super::year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Year.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
