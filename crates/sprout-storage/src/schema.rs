//! Idempotent schema provisioning.
//!
//! Every statement is guarded by `IF NOT EXISTS`, so [`provision`] is safe to
//! run on every startup. Enumerations (role, plan, status, learning level,
//! severity) are stored as lowercase text and checked in application code
//! rather than as Postgres enum types, so adding a variant never needs a
//! migration.

use sprout_core::{Error, Result};
use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    // --- Profiles ---
    r#"CREATE TABLE IF NOT EXISTS profiles (
        id           UUID PRIMARY KEY,
        email        TEXT NOT NULL UNIQUE,
        display_name TEXT,
        role         TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL
    )"#,
    // --- Child profiles ---
    r#"CREATE TABLE IF NOT EXISTS child_profiles (
        id             UUID PRIMARY KEY,
        parent_id      UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        name           TEXT NOT NULL,
        age            SMALLINT NOT NULL,
        avatar_color   TEXT,
        learning_level TEXT NOT NULL,
        created_at     TIMESTAMPTZ NOT NULL,
        updated_at     TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS child_profiles_parent_idx
        ON child_profiles(parent_id)"#,
    // --- Subscriptions (one row per account) ---
    r#"CREATE TABLE IF NOT EXISTS subscriptions (
        id                   UUID PRIMARY KEY,
        user_id              UUID NOT NULL UNIQUE REFERENCES profiles(id) ON DELETE CASCADE,
        plan_type            TEXT NOT NULL,
        status               TEXT NOT NULL,
        current_period_end   TIMESTAMPTZ NOT NULL,
        cancel_at_period_end BOOLEAN NOT NULL DEFAULT FALSE,
        created_at           TIMESTAMPTZ NOT NULL,
        updated_at           TIMESTAMPTZ NOT NULL
    )"#,
    // --- Notifications ---
    r#"CREATE TABLE IF NOT EXISTS notifications (
        id         UUID PRIMARY KEY,
        user_id    UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        message    TEXT NOT NULL,
        is_read    BOOLEAN NOT NULL DEFAULT FALSE,
        read_at    TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS notifications_user_idx
        ON notifications(user_id, created_at DESC)"#,
    // --- System alerts ---
    r#"CREATE TABLE IF NOT EXISTS system_alerts (
        id         UUID PRIMARY KEY,
        severity   TEXT NOT NULL,
        message    TEXT NOT NULL,
        metadata   JSONB,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS system_alerts_created_idx
        ON system_alerts(created_at DESC)"#,
    // --- Error logs ---
    r#"CREATE TABLE IF NOT EXISTS error_logs (
        id         UUID PRIMARY KEY,
        severity   TEXT NOT NULL,
        message    TEXT NOT NULL,
        source     TEXT,
        metadata   JSONB,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS error_logs_created_idx
        ON error_logs(created_at DESC)"#,
    // --- Performance metrics ---
    r#"CREATE TABLE IF NOT EXISTS performance_metrics (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL,
        value      DOUBLE PRECISION NOT NULL,
        unit       TEXT,
        metadata   JSONB,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS performance_metrics_created_idx
        ON performance_metrics(created_at DESC)"#,
];

/// Create every table and index the stores rely on, if missing.
pub async fn provision(pool: &PgPool) -> Result<()> {
    for sql in STATEMENTS {
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|err| Error::storage(format!("schema provisioning failed: {err}")))?;
    }
    tracing::info!(statements = STATEMENTS.len(), "storage schema provisioned");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
