//! Foreign-key derivation for staged uploads.
//!
//! Monitoring/enhancement uploads resolve their period -> year and
//! sub-category -> main-category chains by lookup only; a missing link hard
//! fails staging. The period reference table is the one place a key is
//! derived by lookup-or-create: a year row is created on miss, idempotently,
//! relying on the unique index on `Years.year` rather than check-then-insert.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter, Set,
};

use crate::entity::{main_category, period, sub_category, year};
use crate::error::{AppError, AppResult};
use crate::models::DerivedKeys;

/// Resolve the full key chain for a monitoring/enhancement upload.
///
/// Fails with `UnresolvedForeignKey` if the period, sub-category, or
/// main-category link is missing; there is no sensible fallback.
pub async fn derive_relational_keys(
    db: &DatabaseConnection,
    period_id: i32,
    category_id: &str,
) -> AppResult<DerivedKeys> {
    let period = period::Entity::find_by_id(period_id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up period: {}", e)))?
        .ok_or_else(|| {
            AppError::UnresolvedForeignKey(format!("period {} does not exist", period_id))
        })?;

    let sub = sub_category::Entity::find()
        .filter(sub_category::Column::Name.eq(category_id))
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up sub-category: {}", e)))?
        .ok_or_else(|| {
            AppError::UnresolvedForeignKey(format!(
                "sub-category '{}' has no row in SubCategories",
                category_id
            ))
        })?;

    let main = main_category::Entity::find_by_id(sub.main_category_id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up main category: {}", e)))?
        .ok_or_else(|| {
            AppError::UnresolvedForeignKey(format!(
                "sub-category '{}' points at missing main category {}",
                category_id, sub.main_category_id
            ))
        })?;

    Ok(DerivedKeys {
        period_id: Some(period.id),
        year_id: Some(period.year_id),
        main_category_id: Some(main.id),
        sub_category_id: Some(sub.id),
    })
}

/// Look up or create the `Years` row for a calendar year, returning its id.
///
/// Lookup first, insert on miss with `ON CONFLICT DO NOTHING`, then re-read.
/// Two concurrent callers for the same year converge on the same row.
pub async fn ensure_year<C: ConnectionTrait>(conn: &C, calendar_year: i32) -> AppResult<i32> {
    if let Some(existing) = find_year(conn, calendar_year).await? {
        return Ok(existing.id);
    }

    let insert = year::Entity::insert(year::ActiveModel {
        id: NotSet,
        year: Set(calendar_year),
    })
    .on_conflict(
        OnConflict::column(year::Column::Year)
            .do_nothing()
            .to_owned(),
    )
    .exec(conn)
    .await;

    match insert {
        Ok(_) => {}
        // A concurrent caller inserted the row between our lookup and insert.
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => {
            return Err(AppError::Database(format!(
                "Failed to insert year {}: {}",
                calendar_year, e
            )));
        }
    }

    find_year(conn, calendar_year)
        .await?
        .map(|m| m.id)
        .ok_or_else(|| {
            AppError::Database(format!(
                "Year {} missing immediately after insert",
                calendar_year
            ))
        })
}

async fn find_year<C: ConnectionTrait>(
    conn: &C,
    calendar_year: i32,
) -> AppResult<Option<year::Model>> {
    year::Entity::find()
        .filter(year::Column::Year.eq(calendar_year))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up year: {}", e)))
}
