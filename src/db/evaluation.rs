use chrono::Utc;
use color_eyre::Result;

use super::helpers::{query_all, query_optional};
use super::models::{CriterionRow, EvaluationRow};
use super::Db;

/// One criterion as it leaves the draft for storage.
pub struct SavedCriterion {
    pub name: String,
    pub score: Option<i64>,
    pub note: String,
    pub note_owner: &'static str,
}

impl Db {
    /// Persist a finished evaluation draft atomically.
    pub async fn save_evaluation(
        &self,
        student_id: i64,
        author_id: i64,
        overall_rating: Option<i64>,
        criteria: &[SavedCriterion],
    ) -> Result<i64> {
        let tx = self.conn().transaction().await?;

        tx.execute(
            r#"
            INSERT INTO evaluations (student_id, author_id, created_at, overall_rating)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            libsql::params![
                student_id,
                author_id,
                Utc::now().to_rfc3339(),
                overall_rating
            ],
        )
        .await?;
        let evaluation_id = tx.last_insert_rowid();

        for (position, c) in criteria.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO evaluation_criteria (evaluation_id, position, name, score, note, note_owner)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                libsql::params![
                    evaluation_id,
                    position as i64,
                    c.name.clone(),
                    c.score,
                    c.note.clone(),
                    c.note_owner
                ],
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!("evaluation {evaluation_id} saved for student {student_id}");
        Ok(evaluation_id)
    }

    pub async fn evaluations_for(&self, student_id: i64) -> Result<Vec<EvaluationRow>> {
        query_all(
            self.conn(),
            r#"
            SELECT id, student_id, author_id, created_at, overall_rating
            FROM evaluations WHERE student_id = ?1 ORDER BY id DESC
            "#,
            libsql::params![student_id],
        )
        .await
    }

    pub async fn get_evaluation(
        &self,
        evaluation_id: i64,
    ) -> Result<Option<(EvaluationRow, Vec<CriterionRow>)>> {
        let evaluation: Option<EvaluationRow> = query_optional(
            self.conn(),
            r#"
            SELECT id, student_id, author_id, created_at, overall_rating
            FROM evaluations WHERE id = ?1
            "#,
            libsql::params![evaluation_id],
        )
        .await?;
        let Some(evaluation) = evaluation else {
            return Ok(None);
        };

        let criteria: Vec<CriterionRow> = query_all(
            self.conn(),
            r#"
            SELECT name, score, note, note_owner
            FROM evaluation_criteria WHERE evaluation_id = ?1 ORDER BY position
            "#,
            libsql::params![evaluation_id],
        )
        .await?;

        Ok(Some((evaluation, criteria)))
    }
}
