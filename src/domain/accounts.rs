//! Account domain - DB queries for the identity store (`accounts` table)
//!
//! Accounts hold credentials only; everything the application shows about a
//! user lives on the `profiles` row keyed by the same id.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

#[derive(Debug, sqlx::FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    /// NULL until the address is confirmed; unconfirmed accounts cannot log in
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl AccountRow {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// Look up an account by (lowercased) email
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<AccountRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, email, password_hash, display_name, email_confirmed_at
        FROM accounts
        WHERE email = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// Create an account. When `confirmed` is false the row stays pending until
/// the address is verified out-of-band.
pub async fn create<'e, E>(
    executor: E,
    id: &str,
    email: &str,
    password_hash: &str,
    display_name: &str,
    confirmed: bool,
) -> Result<AccountRow, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO accounts (id, email, password_hash, display_name, email_confirmed_at)
        VALUES ($1, lower($2), $3, $4, CASE WHEN $5 THEN now() ELSE NULL END)
        RETURNING id, email, password_hash, display_name, email_confirmed_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(confirmed)
    .fetch_one(executor)
    .await
}
