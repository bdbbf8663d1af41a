use std::collections::BTreeSet;

use color_eyre::{eyre::eyre, Result};
use ulid::Ulid;

use super::helpers::{query_all, query_count, query_optional};
use super::models::{OptionRow, QuestionRow, QuizListRow, QuizRow};
use super::Db;
use crate::models::{AnswerValue, QuizImport};
use crate::quiz::{AnswerKey, Question, QuestionKind, QuizData};

impl Db {
    /// Insert a quiz with all its questions and options atomically.
    /// Returns the public id (ULID) of the newly created quiz.
    pub async fn load_quiz(&self, import: QuizImport) -> Result<String> {
        if import.questions.is_empty() {
            return Err(eyre!("a quiz needs at least one question"));
        }
        for (idx, q) in import.questions.iter().enumerate() {
            q.validate()
                .map_err(|reason| eyre!("question {}: {reason}", idx + 1))?;
        }

        let public_id = Ulid::new().to_string();
        let tx = self.conn().transaction().await?;

        tx.execute(
            r#"
            INSERT INTO quizzes (public_id, name, time_limit_minutes, shuffle_questions, shuffle_answers)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            libsql::params![
                public_id.clone(),
                import.name.clone(),
                import.time_limit.map(i64::from),
                import.shuffle_questions as i64,
                import.shuffle_answers as i64
            ],
        )
        .await?;
        let quiz_id = tx.last_insert_rowid();

        for (position, q) in import.questions.iter().enumerate() {
            let short_answer = match (&q.kind[..], &q.answer) {
                ("short-answer", AnswerValue::One(a)) => Some(a.clone()),
                _ => None,
            };

            tx.execute(
                r#"
                INSERT INTO questions (quiz_id, position, kind, question, short_answer)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                libsql::params![
                    quiz_id,
                    position as i64,
                    q.kind.clone(),
                    q.question.clone(),
                    short_answer
                ],
            )
            .await?;
            let question_id = tx.last_insert_rowid();

            let answers = q.answer_set();
            for (opt_position, option) in q.options.iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO options (question_id, position, option, is_answer)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    libsql::params![
                        question_id,
                        opt_position as i64,
                        option.clone(),
                        answers.contains(option) as i64
                    ],
                )
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "quiz '{}' created: public_id={public_id}, questions={}",
            import.name,
            import.questions.len()
        );
        Ok(public_id)
    }

    pub async fn quizzes(&self) -> Result<Vec<QuizListRow>> {
        query_all(
            self.conn(),
            r#"
            SELECT q.public_id, q.name,
                   (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id) AS question_count,
                   q.time_limit_minutes
            FROM quizzes q
            ORDER BY q.id
            "#,
            (),
        )
        .await
    }

    pub async fn quiz_header(&self, public_id: &str) -> Result<Option<QuizRow>> {
        query_optional(
            self.conn(),
            r#"
            SELECT id, public_id, name, time_limit_minutes, shuffle_questions, shuffle_answers
            FROM quizzes WHERE public_id = ?1
            "#,
            libsql::params![public_id],
        )
        .await
    }

    pub async fn quiz_header_by_id(&self, id: i64) -> Result<Option<QuizRow>> {
        query_optional(
            self.conn(),
            r#"
            SELECT id, public_id, name, time_limit_minutes, shuffle_questions, shuffle_answers
            FROM quizzes WHERE id = ?1
            "#,
            libsql::params![id],
        )
        .await
    }

    pub async fn questions_count(&self, public_id: &str) -> Result<i64> {
        query_count(
            self.conn(),
            r#"
            SELECT COUNT(*) FROM questions
            JOIN quizzes ON quizzes.id = questions.quiz_id
            WHERE quizzes.public_id = ?1
            "#,
            libsql::params![public_id],
        )
        .await
    }

    /// The full quiz with answer keys, ready for an attempt runner.
    pub async fn get_quiz(&self, public_id: &str) -> Result<Option<QuizData>> {
        let Some(header) = self.quiz_header(public_id).await? else {
            return Ok(None);
        };

        let question_rows: Vec<QuestionRow> = query_all(
            self.conn(),
            r#"
            SELECT id, kind, question, short_answer
            FROM questions WHERE quiz_id = ?1 ORDER BY position
            "#,
            libsql::params![header.id],
        )
        .await?;

        let option_rows: Vec<OptionRow> = query_all(
            self.conn(),
            r#"
            SELECT o.question_id, o.option, o.is_answer
            FROM options o
            JOIN questions q ON q.id = o.question_id
            WHERE q.quiz_id = ?1
            ORDER BY o.question_id, o.position
            "#,
            libsql::params![header.id],
        )
        .await?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in question_rows {
            let kind = QuestionKind::from_str(&row.kind)
                .ok_or_else(|| eyre!("unknown question kind '{}'", row.kind))?;

            let options: Vec<String> = option_rows
                .iter()
                .filter(|o| o.question_id == row.id)
                .map(|o| o.option.clone())
                .collect();

            let key = match kind {
                QuestionKind::ShortAnswer => AnswerKey::Single(
                    row.short_answer
                        .ok_or_else(|| eyre!("short-answer question {} has no key", row.id))?,
                ),
                QuestionKind::MultipleChoice => {
                    let correct = option_rows
                        .iter()
                        .find(|o| o.question_id == row.id && o.is_answer != 0)
                        .ok_or_else(|| eyre!("question {} has no correct option", row.id))?;
                    AnswerKey::Single(correct.option.clone())
                }
                QuestionKind::Checkbox => {
                    let correct: BTreeSet<String> = option_rows
                        .iter()
                        .filter(|o| o.question_id == row.id && o.is_answer != 0)
                        .map(|o| o.option.clone())
                        .collect();
                    if correct.is_empty() {
                        return Err(eyre!("question {} has no correct options", row.id));
                    }
                    AnswerKey::Multi(correct)
                }
            };

            questions.push(Question {
                id: row.id,
                prompt: row.question,
                kind,
                options,
                key,
            });
        }

        Ok(Some(QuizData {
            id: header.id,
            public_id: header.public_id,
            name: header.name,
            time_limit_minutes: header.time_limit_minutes.map(|m| m as u32),
            shuffle_questions: header.shuffle_questions != 0,
            shuffle_answers: header.shuffle_answers != 0,
            questions,
        }))
    }

    pub async fn delete_quiz(&self, public_id: &str) -> Result<()> {
        self.conn()
            .execute(
                "DELETE FROM quizzes WHERE public_id = ?1",
                libsql::params![public_id],
            )
            .await?;

        tracing::info!("deleted quiz {public_id}");
        Ok(())
    }
}
