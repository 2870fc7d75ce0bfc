use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::features::elections::{
    touch_election, ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents,
};
use crate::features::positions::dtos::{CreatePositionDto, UpdatePositionDto};
use crate::features::positions::models::Position;

const POSITION_COLUMNS: &str = "id, election_id, title, display_order, created_at, updated_at";

fn required_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::field("title", "Title is required"));
    }
    Ok(title.to_string())
}

/// Service for ballot positions
pub struct PositionService {
    pool: PgPool,
    events: Arc<ElectionEvents>,
}

impl PositionService {
    pub fn new(pool: PgPool, events: Arc<ElectionEvents>) -> Self {
        Self { pool, events }
    }

    pub async fn list(&self, election_id: Uuid) -> Result<Vec<Position>> {
        let query = format!(
            "SELECT {} FROM positions WHERE election_id = $1 ORDER BY display_order ASC, created_at ASC",
            POSITION_COLUMNS
        );
        let positions = sqlx::query_as::<_, Position>(&query)
            .bind(election_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(positions)
    }

    pub async fn create(&self, election_id: Uuid, dto: CreatePositionDto) -> Result<Position> {
        let title = required_title(&dto.title)?;

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            INSERT INTO positions (election_id, title, display_order)
            VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM positions WHERE election_id = $1)
            )
            RETURNING {}
            "#,
            POSITION_COLUMNS
        );
        let position = sqlx::query_as::<_, Position>(&query)
            .bind(election_id)
            .bind(&title)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create position: {:?}", e);
                AppError::Database(e)
            })?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!(
            "Position created: id={}, election={}, order={}",
            position.id,
            election_id,
            position.display_order
        );
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Position,
            ChangeAction::Created,
            position.id,
        ));

        Ok(position)
    }

    pub async fn update(
        &self,
        election_id: Uuid,
        position_id: Uuid,
        dto: UpdatePositionDto,
    ) -> Result<Position> {
        let title = dto.title.as_deref().map(required_title).transpose()?;

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            UPDATE positions
            SET title = COALESCE($3, title),
                display_order = COALESCE($4, display_order),
                updated_at = NOW()
            WHERE id = $1 AND election_id = $2
            RETURNING {}
            "#,
            POSITION_COLUMNS
        );
        let position = sqlx::query_as::<_, Position>(&query)
            .bind(position_id)
            .bind(election_id)
            .bind(title)
            .bind(dto.display_order)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position {} not found", position_id)))?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!("Position updated: id={}, election={}", position.id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Position,
            ChangeAction::Updated,
            position.id,
        ));

        Ok(position)
    }

    /// Delete a position nobody is running for.
    pub async fn delete(&self, election_id: Uuid, position_id: Uuid) -> Result<()> {
        let mut tx = database::begin(&self.pool).await?;

        let candidates: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM candidates WHERE election_id = $1 AND position_id = $2",
        )
        .bind(election_id)
        .bind(position_id)
        .fetch_one(&mut *tx)
        .await?;

        if candidates > 0 {
            return Err(AppError::Conflict(format!(
                "Position still has {} candidate(s); move or delete them first",
                candidates
            )));
        }

        let result = sqlx::query("DELETE FROM positions WHERE id = $1 AND election_id = $2")
            .bind(position_id)
            .bind(election_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Position {} not found",
                position_id
            )));
        }

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!("Position deleted: id={}, election={}", position_id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Position,
            ChangeAction::Deleted,
            position_id,
        ));
        Ok(())
    }
}
