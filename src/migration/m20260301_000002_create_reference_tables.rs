//! Migration: Create the reference lookup tables.
//!
//! These are the ~8 low-cardinality tables reference-kind uploads target.
//! `Years.year` carries the unique index the lookup-or-create key derivation
//! relies on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE "Years" (
                    id SERIAL PRIMARY KEY,
                    year INTEGER NOT NULL UNIQUE
                );

                CREATE TABLE "Periods" (
                    id SERIAL PRIMARY KEY,
                    period_name VARCHAR(100) NOT NULL,
                    start_date DATE NOT NULL,
                    end_date DATE NOT NULL,
                    year_id INTEGER NOT NULL REFERENCES "Years"(id),
                    UNIQUE (period_name, year_id)
                );

                CREATE TABLE "MainCategories" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL UNIQUE
                );

                CREATE TABLE "SubCategories" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL UNIQUE,
                    main_category_id INTEGER NOT NULL REFERENCES "MainCategories"(id)
                );

                CREATE TABLE "Stations" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL UNIQUE,
                    location VARCHAR(200)
                );

                CREATE TABLE "Companies" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL UNIQUE,
                    contact_email VARCHAR(200)
                );

                CREATE TABLE "Standards" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL,
                    parameter VARCHAR(100) NOT NULL,
                    limit_value NUMERIC,
                    unit VARCHAR(50),
                    UNIQUE (name, parameter)
                );

                CREATE TABLE "Units" (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL UNIQUE,
                    symbol VARCHAR(20)
                );
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS "Units" CASCADE;
                DROP TABLE IF EXISTS "Standards" CASCADE;
                DROP TABLE IF EXISTS "Companies" CASCADE;
                DROP TABLE IF EXISTS "Stations" CASCADE;
                DROP TABLE IF EXISTS "SubCategories" CASCADE;
                DROP TABLE IF EXISTS "MainCategories" CASCADE;
                DROP TABLE IF EXISTS "Periods" CASCADE;
                DROP TABLE IF EXISTS "Years" CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
