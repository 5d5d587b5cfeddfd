use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{DocumentStore, memory::MemoryStore, mysql::MySqlStore};

const CREATE_EMPLOYEES: &str = r#"
    CREATE TABLE IF NOT EXISTS employees (
        id CHAR(24) NOT NULL,
        employee_code VARCHAR(50) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NULL,
        full_name VARCHAR(200) NULL,
        email VARCHAR(254) NULL,
        department VARCHAR(100) NULL,
        created_at DATETIME(6) NULL,
        PRIMARY KEY (id),
        UNIQUE KEY uq_employees_code (employee_code),
        KEY idx_employees_created_at (created_at)
    ) ENGINE = InnoDB DEFAULT CHARSET = utf8mb4
"#;

const CREATE_ATTENDANCE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id CHAR(24) NOT NULL,
        employee_ref CHAR(24) NOT NULL,
        date DATETIME NOT NULL,
        status VARCHAR(10) NULL,
        created_at DATETIME(6) NULL,
        PRIMARY KEY (id),
        UNIQUE KEY uq_attendance_employee_date (employee_ref, date),
        KEY idx_attendance_date (date)
    ) ENGINE = InnoDB DEFAULT CHARSET = utf8mb4
"#;

/// Opens the configured store. `memory://` keeps everything in process.
pub async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if config.uses_memory_store() {
        warn!("DATABASE_URL is memory://, records will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = init_db(config).await?;
    ensure_schema(&pool).await?;
    Ok(Arc::new(MySqlStore::new(pool)))
}

pub async fn init_db(config: &Config) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .idle_timeout(Duration::from_millis(config.db_idle_timeout_ms))
        .acquire_timeout(Duration::from_millis(config.db_connect_timeout_ms))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    info!(
        max_connections = config.db_max_connections,
        min_connections = config.db_min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Creates both tables and their unique indexes when missing.
pub async fn ensure_schema(pool: &MySqlPool) -> anyhow::Result<()> {
    for statement in [CREATE_EMPLOYEES, CREATE_ATTENDANCE] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to create schema")?;
    }
    Ok(())
}
