use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::{
    errors::StoreError,
    models::{ParticipantModel, SessionId, SessionModel, SessionStatus},
    repository::SessionRepository,
};

/// PostgreSQL implementation of session repository
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and applies the embedded migrations
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(Self::new(pool))
    }

    fn session_from_row(row: &PgRow) -> Result<SessionModel, StoreError> {
        let status: String = row.try_get("status")?;
        let status = SessionStatus::from_str(&status)
            .map_err(|_| StoreError::Database(format!("unknown session status: {}", status)))?;

        Ok(SessionModel {
            id: row.try_get("id")?,
            status,
            max_participants: row.try_get("max_participants")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn participant_from_row(row: &PgRow) -> Result<ParticipantModel, StoreError> {
        Ok(ParticipantModel {
            session_id: row.try_get("session_id")?,
            user_id: row.try_get("user_id")?,
            display_name: row.try_get("display_name")?,
            join_order: row.try_get("join_order")?,
            is_ready: row.try_get("is_ready")?,
            is_current_turn: row.try_get("is_current_turn")?,
        })
    }
}

fn log_failure(action: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        warn!(error = %e, action, "Session store query failed");
        StoreError::from(e)
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self))]
    async fn create_session(&self, max_participants: i32) -> Result<SessionId, StoreError> {
        let row = sqlx::query(
            "INSERT INTO game_sessions (status, max_participants) VALUES ($1, $2) RETURNING id",
        )
        .bind(SessionStatus::Waiting.as_ref())
        .bind(max_participants)
        .fetch_one(&self.pool)
        .await
        .map_err(log_failure("create_session"))?;

        let id: SessionId = row.try_get("id")?;
        debug!(session_id = id, "Session created in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionModel>, StoreError> {
        let row = sqlx::query(
            "SELECT id, status, max_participants, created_at FROM game_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_failure("get_session"))?;

        row.as_ref().map(Self::session_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_open_sessions(&self) -> Result<Vec<SessionModel>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, status, max_participants, created_at FROM game_sessions \
             WHERE status != $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(SessionStatus::Finished.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(log_failure("list_open_sessions"))?;

        rows.iter().map(Self::session_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn set_session_status(
        &self,
        session_id: SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE game_sessions SET status = $1 WHERE id = $2")
            .bind(status.as_ref())
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(log_failure("set_session_status"))?;
        Ok(())
    }

    #[instrument(skip(self, participant), fields(session_id = participant.session_id, user_id = %participant.user_id))]
    async fn add_participant(&self, participant: &ParticipantModel) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO session_participants \
             (session_id, user_id, display_name, join_order, is_ready, is_current_turn) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(participant.session_id)
        .bind(&participant.user_id)
        .bind(&participant.display_name)
        .bind(participant.join_order)
        .bind(participant.is_ready)
        .bind(participant.is_current_turn)
        .execute(&self.pool)
        .await
        .map_err(log_failure("add_participant"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ParticipantModel>, StoreError> {
        let rows = sqlx::query(
            "SELECT session_id, user_id, display_name, join_order, is_ready, is_current_turn \
             FROM session_participants WHERE session_id = $1 ORDER BY join_order",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_failure("list_participants"))?;

        rows.iter().map(Self::participant_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn set_participant_ready(
        &self,
        session_id: SessionId,
        user_id: &str,
        is_ready: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE session_participants SET is_ready = $1 WHERE session_id = $2 AND user_id = $3",
        )
        .bind(is_ready)
        .bind(session_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(log_failure("set_participant_ready"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_current_turn(
        &self,
        session_id: SessionId,
        user_id: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_failure("begin_turn_transaction"))?;

        sqlx::query("UPDATE session_participants SET is_current_turn = FALSE WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(log_failure("clear_current_turns"))?;

        sqlx::query(
            "UPDATE session_participants SET is_current_turn = TRUE \
             WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(log_failure("set_current_turn"))?;

        tx.commit()
            .await
            .map_err(log_failure("commit_turn_transaction"))?;

        debug!(session_id = session_id, user_id = %user_id, "Turn committed in database");
        Ok(())
    }
}
