//! Migration: Create the monitoring measurement tables.
//!
//! One table per monitoring sub-category; columns follow the catalog
//! dictionaries. Mixed-case measurement columns are quoted so they match the
//! identifiers the approval committer emits.

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
                -- Ambient air (ppm measurements)
                CREATE TABLE "Env_Wind_SO2" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_ppm NUMERIC,
                    day2nd_result_ppm NUMERIC,
                    day3rd_result_ppm NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Wind_NO2" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_ppm NUMERIC,
                    day2nd_result_ppm NUMERIC,
                    day3rd_result_ppm NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Wind_CO" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_ppm NUMERIC,
                    day2nd_result_ppm NUMERIC,
                    day3rd_result_ppm NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Wind_O3" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_ppm NUMERIC,
                    day2nd_result_ppm NUMERIC,
                    day3rd_result_ppm NUMERIC,
                    std_value NUMERIC
                );

                -- Ambient dust (mg/m3 measurements)
                CREATE TABLE "Env_Wind_TSP" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_mgm3 NUMERIC,
                    day2nd_result_mgm3 NUMERIC,
                    day3rd_result_mgm3 NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Wind_PM10" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    day1st_result_mgm3 NUMERIC,
                    day2nd_result_mgm3 NUMERIC,
                    day3rd_result_mgm3 NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Wind_Speed" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    avg_speed_ms NUMERIC,
                    max_speed_ms NUMERIC,
                    direction VARCHAR(20)
                );

                -- Noise
                CREATE TABLE "Env_Noise_Leq24" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    "day1st_Leq" NUMERIC,
                    "day2nd_Leq" NUMERIC,
                    "day3rd_Leq" NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Noise_Lmax" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    "day1st_Lmax" NUMERIC,
                    "day2nd_Lmax" NUMERIC,
                    "day3rd_Lmax" NUMERIC,
                    std_value NUMERIC
                );

                CREATE TABLE "Env_Noise_Ldn" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    "day1st_Ldn" NUMERIC,
                    "day2nd_Ldn" NUMERIC,
                    "day3rd_Ldn" NUMERIC,
                    std_value NUMERIC
                );

                -- Vibration
                CREATE TABLE "Env_Vibration_PPV" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    ppv_mms NUMERIC,
                    freq_hz NUMERIC,
                    std_value NUMERIC
                );

                -- Water quality
                CREATE TABLE "Env_Water_Surface" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    ph_value NUMERIC,
                    bod_mgl NUMERIC,
                    do_mgl NUMERIC,
                    ss_mgl NUMERIC,
                    temperature_c NUMERIC
                );

                CREATE TABLE "Env_Water_Ground" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    ph_value NUMERIC,
                    hardness_mgl NUMERIC,
                    tds_mgl NUMERIC,
                    coliform_mpn NUMERIC
                );

                CREATE TABLE "Env_Water_Waste" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    ph_value NUMERIC,
                    bod_mgl NUMERIC,
                    cod_mgl NUMERIC,
                    ss_mgl NUMERIC,
                    oil_grease_mgl NUMERIC
                );

                CREATE TABLE "Env_Water_Sea" (
                    id SERIAL PRIMARY KEY,
                    period_id INTEGER NOT NULL REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    station_id INTEGER,
                    company_id INTEGER,
                    report_by VARCHAR(100),
                    ph_value NUMERIC,
                    do_mgl NUMERIC,
                    salinity_ppt NUMERIC,
                    temperature_c NUMERIC
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
                DROP TABLE IF EXISTS "Env_Water_Sea" CASCADE;
                DROP TABLE IF EXISTS "Env_Water_Waste" CASCADE;
                DROP TABLE IF EXISTS "Env_Water_Ground" CASCADE;
                DROP TABLE IF EXISTS "Env_Water_Surface" CASCADE;
                DROP TABLE IF EXISTS "Env_Vibration_PPV" CASCADE;
                DROP TABLE IF EXISTS "Env_Noise_Ldn" CASCADE;
                DROP TABLE IF EXISTS "Env_Noise_Lmax" CASCADE;
                DROP TABLE IF EXISTS "Env_Noise_Leq24" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_Speed" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_PM10" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_TSP" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_O3" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_CO" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_NO2" CASCADE;
                DROP TABLE IF EXISTS "Env_Wind_SO2" CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
