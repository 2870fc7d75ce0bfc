use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::features::elections::{
    touch_election, ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents,
};
use crate::features::voters::models::Voter;

const VOTER_COLUMNS: &str = "id, election_id, email, has_voted, created_at, updated_at";

const EMAIL_CONSTRAINT: &str = "uq_voters_election_email";

/// Emails are compared case-insensitively
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn email_taken_error() -> AppError {
    AppError::field("email", "Voter is already added to this election")
}

/// Service for the election voter roll
pub struct VoterService {
    pool: PgPool,
    events: Arc<ElectionEvents>,
}

impl VoterService {
    pub fn new(pool: PgPool, events: Arc<ElectionEvents>) -> Self {
        Self { pool, events }
    }

    /// One page of voters plus the total count
    pub async fn list(&self, election_id: Uuid, offset: i64, limit: i64) -> Result<(Vec<Voter>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM voters WHERE election_id = $1")
            .bind(election_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count voters: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            r#"
            SELECT {}
            FROM voters
            WHERE election_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
            VOTER_COLUMNS
        );
        let voters = sqlx::query_as::<_, Voter>(&query)
            .bind(election_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list voters: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((voters, total))
    }

    pub async fn add(&self, election_id: Uuid, raw_email: &str) -> Result<Voter> {
        let email = normalize_email(raw_email);

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM voters WHERE election_id = $1 AND LOWER(email) = $2)",
        )
        .bind(election_id)
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(email_taken_error());
        }

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            "INSERT INTO voters (election_id, email) VALUES ($1, $2) RETURNING {}",
            VOTER_COLUMNS
        );
        let voter = sqlx::query_as::<_, Voter>(&query)
            .bind(election_id)
            .bind(&email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                let is_duplicate = e
                    .as_database_error()
                    .and_then(|db| db.constraint())
                    .is_some_and(|constraint| constraint == EMAIL_CONSTRAINT);
                if is_duplicate {
                    return email_taken_error();
                }
                tracing::error!("Failed to add voter: {:?}", e);
                AppError::Database(e)
            })?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!("Voter added: id={}, election={}", voter.id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Voter,
            ChangeAction::Created,
            voter.id,
        ));

        Ok(voter)
    }

    pub async fn delete(&self, election_id: Uuid, voter_id: Uuid) -> Result<()> {
        let mut tx = database::begin(&self.pool).await?;

        let result = sqlx::query("DELETE FROM voters WHERE id = $1 AND election_id = $2")
            .bind(voter_id)
            .bind(election_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Voter {} not found", voter_id)));
        }

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!("Voter deleted: id={}, election={}", voter_id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Voter,
            ChangeAction::Deleted,
            voter_id,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Juan@Example.COM "), "juan@example.com");
    }

    #[test]
    fn test_email_taken_is_field_error() {
        assert!(matches!(
            email_taken_error(),
            AppError::FieldValidation { ref field, .. } if field == "email"
        ));
    }
}
