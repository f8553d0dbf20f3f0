//! Admin whitelist repository.
//!
//! An email must be present in this table before an admin login is honored,
//! independent of password correctness.

use sqlx::SqlitePool;

use crate::{CampusError, Result};

/// Repository for the admin whitelist.
pub struct WhitelistRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WhitelistRepository<'a> {
    /// Create a new WhitelistRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Check whether an email is whitelisted (case-insensitive).
    pub async fn contains(&self, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM admin_whitelist WHERE email = ? COLLATE NOCASE)",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// Add an email to the whitelist.
    ///
    /// Adding an already-present email is a no-op.
    pub async fn add(&self, email: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO admin_whitelist (email) VALUES (?)")
            .bind(email)
            .execute(self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove an email from the whitelist.
    ///
    /// Returns true if an entry was removed.
    pub async fn remove(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admin_whitelist WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .execute(self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// List all whitelisted emails.
    pub async fn list(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT email FROM admin_whitelist ORDER BY email")
                .fetch_all(self.pool)
                .await
                .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|(email,)| email).collect())
    }

    /// Seed the whitelist from configuration.
    ///
    /// Missing entries are added; existing entries are never removed here -
    /// removal is a deliberate runtime operation.
    pub async fn seed(&self, emails: &[String]) -> Result<()> {
        for email in emails {
            self.add(email).await?;
        }
        Ok(())
    }
}
