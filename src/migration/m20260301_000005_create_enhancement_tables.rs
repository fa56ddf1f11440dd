//! Migration: Create the enhancement sub-tables.
//!
//! One table per enhancement measure; columns follow the catalog
//! dictionaries.

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
                CREATE TABLE "Env_Enhance_GreenArea" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    area_sqm NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_TreePlanting" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    tree_count INTEGER,
                    species VARCHAR(200),
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_DustControl" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    method VARCHAR(200),
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_NoiseBarrier" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    length_m NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_WaterTreatment" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    volume_m3 NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_WasteSorting" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    tonnage NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_EnergySaving" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    kwh_saved NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_OdorControl" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    method VARCHAR(200),
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_ErosionControl" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    area_sqm NUMERIC,
                    result TEXT,
                    progress_pct NUMERIC
                );

                CREATE TABLE "Env_Enhance_CommunityOutreach" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    activity TEXT,
                    participants INTEGER,
                    result TEXT,
                    progress_pct NUMERIC
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
                DROP TABLE IF EXISTS "Env_Enhance_CommunityOutreach" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_ErosionControl" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_OdorControl" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_EnergySaving" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_WasteSorting" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_WaterTreatment" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_NoiseBarrier" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_DustControl" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_TreePlanting" CASCADE;
                DROP TABLE IF EXISTS "Env_Enhance_GreenArea" CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
