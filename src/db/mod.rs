use std::sync::Arc;

use color_eyre::{eyre::OptionExt, Result};

pub mod models;
pub use models::*;

mod evaluation;
pub use evaluation::SavedCriterion;
mod helpers;
mod quiz;
mod result;
mod schema;
mod user;

#[derive(Clone)]
pub struct Db {
    // Kept alive for the lifetime of the handle; connections borrow it.
    _db: Arc<libsql::Database>,
    conn: libsql::Connection,
}

impl Db {
    /// `file:` urls open a local SQLite database, anything else is treated
    /// as a remote Turso url.
    pub async fn new(url: String, auth_token: String) -> Result<Self> {
        let db = if let Some(path) = url.strip_prefix("file:") {
            libsql::Builder::new_local(path).build().await?
        } else {
            libsql::Builder::new_remote(url, auth_token).build().await?
        };

        let conn = db.connect()?;

        let one = conn
            .query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or_eyre("connection check failed")?
            .get::<i32>(0)?;
        if one != 1 {
            return Err(color_eyre::eyre::eyre!("connection check failed"));
        }

        conn.execute("PRAGMA foreign_keys = ON", ()).await?;

        schema::create_schema(&conn).await?;

        tracing::info!("database connection has been verified");

        Ok(Self {
            _db: Arc::new(db),
            conn,
        })
    }

    pub(crate) fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
