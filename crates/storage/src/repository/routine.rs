use sqlx::PgPool;

use crate::error::Result;
use crate::models::{PlannedDay, RoutineDay};

/// Repository for per-weekday routine rows
pub struct RoutineRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoutineRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace the user's whole routine in one transaction
    pub async fn replace(&self, user_id: &str, days: &[PlannedDay]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM routine_days WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for day in days {
            sqlx::query(
                r#"
                INSERT INTO routine_days (user_id, weekday, exercises, updated_at)
                VALUES ($1, $2, $3, NOW())
                "#,
            )
            .bind(user_id)
            .bind(day.weekday)
            .bind(sqlx::types::Json(&day.exercises))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the saved days ordered by weekday
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<RoutineDay>> {
        let days = sqlx::query_as::<_, RoutineDay>(
            r#"
            SELECT routine_id, user_id, weekday, exercises, updated_at
            FROM routine_days
            WHERE user_id = $1
            ORDER BY weekday
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(days)
    }
}
