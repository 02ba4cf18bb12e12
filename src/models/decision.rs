//! Decision model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::fusion::Action;

/// One persisted decision. Immutable after insert; ids are assigned
/// monotonically by the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Decision {
    pub id: i64,
    pub entity_id: String,
    pub action: i16,
    pub risk: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// One row of the retraining dataset: a decision joined with its outcome
/// and reward, when recorded.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainingRecord {
    pub decision_id: i64,
    pub entity_id: String,
    pub action: i16,
    pub risk: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub outcome: Option<String>,
    pub reward: Option<f64>,
}

impl Decision {
    pub async fn insert(
        pool: &PgPool,
        entity_id: &str,
        action: Action,
        risk: Option<f64>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Decision>(
            r#"
            INSERT INTO decisions (entity_id, action, risk)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(entity_id)
        .bind(action.index())
        .bind(risk)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Decision>("SELECT * FROM decisions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stored action column decoded back to the action space
    pub fn action_kind(&self) -> Option<Action> {
        Action::from_index(self.action as i64)
    }

    /// All decisions joined with their outcomes and rewards, oldest first.
    /// This is the read contract consumed by offline policy retraining.
    pub async fn training_records(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TrainingRecord>, sqlx::Error> {
        sqlx::query_as::<_, TrainingRecord>(
            r#"
            SELECT d.id AS decision_id, d.entity_id, d.action, d.risk, d.created_at,
                   o.outcome, r.reward
            FROM decisions d
            LEFT JOIN outcomes o ON o.decision_id = d.id
            LEFT JOIN rewards r ON r.decision_id = d.id
            ORDER BY d.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
