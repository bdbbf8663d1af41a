use color_eyre::Result;
use sha2::{Digest, Sha256};
use ulid::Ulid;

use super::helpers::{query_all, query_optional};
use super::models::{AuthUser, StudentRow};
use super::Db;
use crate::names;

fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

impl Db {
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: &str,
    ) -> Result<i64> {
        self.conn()
            .execute(
                "INSERT INTO users (email, password_hash, display_name, role) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![email, hash_password(password), display_name, role],
            )
            .await?;

        let id = self.conn().last_insert_rowid();
        tracing::info!("created {role} user {id} ({email})");
        Ok(id)
    }

    /// Startup bootstrap: creates the admin account if the email is unknown.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        let existing: Option<AuthUser> = query_optional(
            self.conn(),
            "SELECT id, email, display_name, role FROM users WHERE email = ?1",
            libsql::params![email],
        )
        .await?;

        if existing.is_none() {
            self.create_user(email, password, "Administrator", names::ROLE_ADMIN)
                .await?;
        }
        Ok(())
    }

    /// Checks the credentials and returns the user on a match.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        let user: Option<AuthUser> = query_optional(
            self.conn(),
            "SELECT id, email, display_name, role FROM users WHERE email = ?1 AND password_hash = ?2",
            libsql::params![email, hash_password(password)],
        )
        .await?;

        Ok(user)
    }

    pub async fn create_user_session(&self, user_id: i64) -> Result<String> {
        let session_id = Ulid::new().to_string();
        self.conn()
            .execute(
                "INSERT INTO user_sessions (id, user_id) VALUES (?1, ?2)",
                libsql::params![session_id.clone(), user_id],
            )
            .await?;

        Ok(session_id)
    }

    pub async fn get_user_by_session(&self, session_id: &str) -> Result<Option<AuthUser>> {
        let user: Option<AuthUser> = query_optional(
            self.conn(),
            r#"
            SELECT u.id, u.email, u.display_name, u.role
            FROM user_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = ?1
            "#,
            libsql::params![session_id],
        )
        .await?;

        Ok(user)
    }

    pub async fn delete_user_session(&self, session_id: &str) -> Result<()> {
        self.conn()
            .execute(
                "DELETE FROM user_sessions WHERE id = ?1",
                libsql::params![session_id],
            )
            .await?;

        Ok(())
    }

    pub async fn students(&self) -> Result<Vec<StudentRow>> {
        query_all(
            self.conn(),
            "SELECT id, email, display_name FROM users WHERE role = ?1 ORDER BY display_name",
            libsql::params![names::ROLE_STUDENT],
        )
        .await
    }

    pub async fn get_student(&self, student_id: i64) -> Result<Option<StudentRow>> {
        query_optional(
            self.conn(),
            "SELECT id, email, display_name FROM users WHERE id = ?1 AND role = ?2",
            libsql::params![student_id, names::ROLE_STUDENT],
        )
        .await
    }
}
