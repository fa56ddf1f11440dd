//! Migration: Create the upload artifacts table.
//!
//! One row per staged upload: metadata, category binding, resolved mapping,
//! serialized rows, derived keys, and the decision fields.

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
                CREATE TABLE upload_artifacts (
                    id UUID PRIMARY KEY,
                    original_filename VARCHAR(255) NOT NULL,
                    storage_filename VARCHAR(255) NOT NULL,
                    byte_size BIGINT NOT NULL,
                    media_type VARCHAR(100) NOT NULL,
                    uploaded_by VARCHAR(100) NOT NULL,
                    status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'approved', 'rejected')),
                    category_kind VARCHAR(20) NOT NULL
                        CHECK (category_kind IN ('monitoring', 'enhancement', 'reference')),
                    category_id VARCHAR(100) NOT NULL,
                    target_table VARCHAR(100) NOT NULL,

                    -- external field -> target column, empty for reference
                    column_mapping JSONB NOT NULL DEFAULT '{}'::jsonb,
                    -- {headers: [...], rows: [{...}, ...]} as parsed
                    rows JSONB NOT NULL,
                    row_count INTEGER NOT NULL CHECK (row_count >= 0),

                    period_id INTEGER REFERENCES "Periods"(id),
                    year_id INTEGER REFERENCES "Years"(id),
                    main_category_id INTEGER REFERENCES "MainCategories"(id),
                    sub_category_id INTEGER REFERENCES "SubCategories"(id),

                    decided_by VARCHAR(100),
                    decided_at TIMESTAMPTZ,
                    decision_reason TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- The review queue is the hot path
                CREATE INDEX idx_upload_artifacts_status ON upload_artifacts(status);
                CREATE INDEX idx_upload_artifacts_pending_kind
                    ON upload_artifacts(category_kind)
                    WHERE status = 'pending';
                CREATE INDEX idx_upload_artifacts_created_at
                    ON upload_artifacts(created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS upload_artifacts CASCADE;")
            .await?;

        Ok(())
    }
}
