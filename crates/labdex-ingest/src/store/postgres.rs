// PostgreSQL Catalog Store

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::models::{Exam, Machine, Module, Unit, Vulnerability};
use crate::store::CatalogStore;
use crate::Result;

/// Catalog store backed by PostgreSQL.
///
/// Every statement is an independent idempotent write, so a run that stops
/// partway leaves a valid (if incomplete) state that the next run converges.
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build a connection pool from configuration and connect.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;

        info!("Connected to database");

        Ok(Self::new(db))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.db).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Underlying connection pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn upsert_module(&self, module: &Module) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO modules (id, name, description, difficulty, url, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                difficulty = EXCLUDED.difficulty,
                url = EXCLUDED.url,
                avatar = EXCLUDED.avatar,
                updated_at = NOW()
            "#,
        )
        .bind(module.id)
        .bind(&module.name)
        .bind(&module.description)
        .bind(module.difficulty.as_str())
        .bind(&module.url)
        .bind(&module.avatar)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO units (id, module_id, position, name, kind)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id, module_id)
            DO UPDATE SET
                position = EXCLUDED.position,
                name = EXCLUDED.name,
                kind = EXCLUDED.kind,
                updated_at = NOW()
            "#,
        )
        .bind(unit.id)
        .bind(unit.module_id)
        .bind(unit.position)
        .bind(&unit.name)
        .bind(unit.kind.as_str())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_machine(&self, machine: &Machine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machines (id, name, synopsis, difficulty, os, url, avatar)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                synopsis = EXCLUDED.synopsis,
                difficulty = EXCLUDED.difficulty,
                os = EXCLUDED.os,
                url = EXCLUDED.url,
                avatar = EXCLUDED.avatar,
                updated_at = NOW()
            "#,
        )
        .bind(machine.id)
        .bind(&machine.name)
        .bind(&machine.synopsis)
        .bind(machine.difficulty.as_str())
        .bind(machine.os.as_str())
        .bind(&machine.url)
        .bind(&machine.avatar)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_exam(&self, exam: &Exam) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exams (id, name, logo)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                logo = EXCLUDED.logo,
                updated_at = NOW()
            "#,
        )
        .bind(exam.id)
        .bind(&exam.name)
        .bind(&exam.logo)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vulnerabilities (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                updated_at = NOW()
            "#,
        )
        .bind(vulnerability.id)
        .bind(&vulnerability.name)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn link_machine_module(&self, machine_id: i64, module_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machine_modules (machine_id, module_id)
            VALUES ($1, $2)
            ON CONFLICT (machine_id, module_id)
            DO NOTHING
            "#,
        )
        .bind(machine_id)
        .bind(module_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn link_module_exam(&self, module_id: i64, exam_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO module_exams (module_id, exam_id)
            VALUES ($1, $2)
            ON CONFLICT (module_id, exam_id)
            DO NOTHING
            "#,
        )
        .bind(module_id)
        .bind(exam_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn link_machine_vulnerability(
        &self,
        machine_id: i64,
        vulnerability_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machine_vulnerabilities (machine_id, vulnerability_id)
            VALUES ($1, $2)
            ON CONFLICT (machine_id, vulnerability_id)
            DO NOTHING
            "#,
        )
        .bind(machine_id)
        .bind(vulnerability_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn link_machine_language(&self, machine_id: i64, language: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machine_languages (machine_id, language)
            VALUES ($1, $2)
            ON CONFLICT (machine_id, language)
            DO NOTHING
            "#,
        )
        .bind(machine_id)
        .bind(language)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn link_machine_area(&self, machine_id: i64, area: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machine_areas_of_interest (machine_id, area)
            VALUES ($1, $2)
            ON CONFLICT (machine_id, area)
            DO NOTHING
            "#,
        )
        .bind(machine_id)
        .bind(area)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn all_machine_ids(&self) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM machines ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn all_exam_ids(&self) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM exams ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(ids)
    }
}
