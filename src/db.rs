//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
///
/// decision_id is the join key throughout; outcomes and rewards key on it
/// directly so a decision can carry at most one of each.
const SCHEMA_SQL: &str = r#"
-- Decisions (one row per /decide call that reached the ledger)
CREATE TABLE IF NOT EXISTS decisions (
    id BIGSERIAL PRIMARY KEY,
    entity_id VARCHAR(255) NOT NULL,
    action SMALLINT NOT NULL,
    risk DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Outcomes (ground truth, recorded once per decision)
CREATE TABLE IF NOT EXISTS outcomes (
    decision_id BIGINT PRIMARY KEY REFERENCES decisions(id) ON DELETE CASCADE,
    outcome VARCHAR(32) NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Rewards (derived from action x outcome)
CREATE TABLE IF NOT EXISTS rewards (
    decision_id BIGINT PRIMARY KEY REFERENCES decisions(id) ON DELETE CASCADE,
    reward DOUBLE PRECISION NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_decisions_entity ON decisions(entity_id);
CREATE INDEX IF NOT EXISTS idx_decisions_created ON decisions(created_at);
"#;
