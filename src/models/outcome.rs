//! Outcome and reward persistence

use metrics::counter;
use sqlx::{FromRow, PgPool};

use crate::fusion::Action;
use crate::telemetry::REWARDS_RECONCILED;
use crate::rewards::{reward_for, OutcomeKind};

/// Persist an outcome and its reward as one logical unit
///
/// Both rows commit or neither does; the reconciliation sweep covers rows
/// written by older deployments that lacked the transaction.
pub async fn record_feedback(
    pool: &PgPool,
    decision_id: i64,
    outcome: OutcomeKind,
    reward: f64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO outcomes (decision_id, outcome) VALUES ($1, $2)")
        .bind(decision_id)
        .bind(outcome.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO rewards (decision_id, reward) VALUES ($1, $2)")
        .bind(decision_id)
        .bind(reward)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

#[derive(Debug, FromRow)]
struct UnrewardedOutcome {
    decision_id: i64,
    action: i16,
    outcome: String,
}

/// Backfill rewards for decisions that have an outcome but no reward
///
/// The reward is re-derived from stored state, so the repair is
/// deterministic. Returns the number of rows repaired.
pub async fn reconcile_rewards(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let rows: Vec<UnrewardedOutcome> = sqlx::query_as(
        r#"
        SELECT d.id AS decision_id, d.action, o.outcome
        FROM decisions d
        JOIN outcomes o ON o.decision_id = d.id
        LEFT JOIN rewards r ON r.decision_id = d.id
        WHERE r.decision_id IS NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut repaired = 0u64;
    for row in rows {
        let Some(action) = Action::from_index(row.action as i64) else {
            tracing::error!(
                "Decision {} has unknown action {}; skipping reconciliation",
                row.decision_id,
                row.action
            );
            continue;
        };
        let Some(outcome) = OutcomeKind::parse(&row.outcome) else {
            tracing::error!(
                "Decision {} has unknown outcome {:?}; skipping reconciliation",
                row.decision_id,
                row.outcome
            );
            continue;
        };

        let reward = reward_for(action, outcome);
        sqlx::query(
            "INSERT INTO rewards (decision_id, reward) VALUES ($1, $2) ON CONFLICT (decision_id) DO NOTHING",
        )
        .bind(row.decision_id)
        .bind(reward)
        .execute(pool)
        .await?;

        repaired += 1;
    }

    if repaired > 0 {
        counter!(REWARDS_RECONCILED).increment(repaired);
    }

    Ok(repaired)
}

/// True when the error is a unique-key conflict (outcome already recorded)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
