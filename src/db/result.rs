use color_eyre::Result;

use super::helpers::{query_all, query_optional};
use super::models::{ResultRow, ResultSummaryRow};
use super::Db;
use crate::quiz::runner::ResultSink;
use crate::quiz::score::QuizResult;

impl Db {
    /// Latest graded result, used to gate re-attempts. Practice rows never
    /// block anything.
    pub async fn prior_graded_result(
        &self,
        quiz_id: i64,
        user_id: i64,
    ) -> Result<Option<ResultSummaryRow>> {
        query_optional(
            self.conn(),
            r#"
            SELECT id, taken_at, score, total, is_practice
            FROM results
            WHERE quiz_id = ?1 AND user_id = ?2 AND is_practice = 0
            ORDER BY id DESC
            "#,
            libsql::params![quiz_id, user_id],
        )
        .await
    }

    pub async fn results_for(&self, quiz_id: i64, user_id: i64) -> Result<Vec<ResultSummaryRow>> {
        query_all(
            self.conn(),
            r#"
            SELECT id, taken_at, score, total, is_practice
            FROM results
            WHERE quiz_id = ?1 AND user_id = ?2
            ORDER BY id DESC
            "#,
            libsql::params![quiz_id, user_id],
        )
        .await
    }

    pub async fn get_result(&self, result_id: i64) -> Result<Option<ResultRow>> {
        query_optional(
            self.conn(),
            r#"
            SELECT id, quiz_id, user_id, taken_at, score, total, is_practice, details
            FROM results WHERE id = ?1
            "#,
            libsql::params![result_id],
        )
        .await
    }

    /// Average graded percentage across all of a student's attempts.
    /// Practice rows are excluded by definition.
    pub async fn graded_average(&self, user_id: i64) -> Result<Option<f64>> {
        let mut rows = self
            .conn()
            .query(
                r#"
                SELECT AVG(score * 100.0 / total)
                FROM results
                WHERE user_id = ?1 AND is_practice = 0 AND total > 0
                "#,
                libsql::params![user_id],
            )
            .await?;

        // AVG over zero rows is NULL.
        let avg = match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                libsql::Value::Real(v) => Some(v),
                libsql::Value::Integer(v) => Some(v as f64),
                _ => None,
            },
            None => None,
        };
        Ok(avg)
    }
}

impl ResultSink for Db {
    /// Append-only: a submitted result is inserted once and never updated.
    async fn persist_result(&self, quiz_id: i64, user_id: i64, result: &QuizResult) -> Result<()> {
        let details = serde_json::to_string(&result.answered)?;

        self.conn()
            .execute(
                r#"
                INSERT INTO results (quiz_id, user_id, taken_at, score, total, is_practice, details)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                libsql::params![
                    quiz_id,
                    user_id,
                    result.taken_at.to_rfc3339(),
                    result.score as i64,
                    result.total as i64,
                    result.is_practice as i64,
                    details
                ],
            )
            .await?;

        tracing::info!(
            "result persisted: quiz={quiz_id} user={user_id} {}/{} practice={}",
            result.score,
            result.total,
            result.is_practice
        );
        Ok(())
    }
}
