//! Profile domain - DB queries for the `profiles` table
//!
//! All functions use the generic Executor pattern, allowing them to work
//! with both `&PgPool` (for standalone queries) and `&mut PgConnection`
//! (for transactions).

use sqlx::{Executor, Postgres};

use crate::models::UserProfile;

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub credits: i64,
    pub acesso_prof_usuario: i32,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.id,
            display_name: row.display_name,
            email: row.email,
            credits: row.credits,
            access_tier: row.acesso_prof_usuario,
            phone: row.phone,
            tax_id: row.tax_id,
            avatar_url: row.avatar_url,
        }
    }
}

const PROFILE_COLUMNS: &str =
    "id, display_name, email, credits, acesso_prof_usuario, phone, tax_id, avatar_url";

/// Fetch a profile by id
pub async fn get<'e, E>(executor: E, id: &str) -> Result<Option<ProfileRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Fuzzy lookup used by login: display name (case-insensitive), email, or
/// phone may all identify a profile
pub async fn find_by_identifier<'e, E>(
    executor: E,
    identifier: &str,
) -> Result<Option<ProfileRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        SELECT {PROFILE_COLUMNS} FROM profiles
        WHERE display_name ILIKE $1
           OR lower(email) = lower($1)
           OR phone = $1
        LIMIT 1
        "#
    ))
    .bind(identifier)
    .fetch_optional(executor)
    .await
}

/// Exact display-name lookup used by the demo login shortcut
pub async fn find_by_display_name<'e, E>(
    executor: E,
    display_name: &str,
) -> Result<Option<ProfileRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE display_name = $1 LIMIT 1"
    ))
    .bind(display_name)
    .fetch_optional(executor)
    .await
}

/// Create the default profile row on first login, or return the existing
/// one untouched if a concurrent login already created it
pub async fn upsert_default<'e, E>(
    executor: E,
    id: &str,
    display_name: &str,
    email: Option<&str>,
    credits: i64,
    access_tier: i32,
) -> Result<ProfileRow, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        INSERT INTO profiles (id, display_name, email, credits, acesso_prof_usuario)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(display_name)
    .bind(email)
    .bind(credits)
    .bind(access_tier)
    .fetch_one(executor)
    .await
}

/// Conditional decrement: succeeds only while the stored balance covers the
/// cost, and returns the authoritative post-balance. `None` means the
/// precondition failed and nothing was written.
pub async fn try_spend_credits<'e, E>(
    executor: E,
    id: &str,
    cost: i64,
) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE profiles
        SET credits = credits - $2
        WHERE id = $1 AND credits >= $2
        RETURNING credits
        "#,
    )
    .bind(id)
    .bind(cost)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(credits,)| credits))
}

/// Read just the balance
pub async fn fetch_credits<'e, E>(executor: E, id: &str) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT credits FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(credits,)| credits))
}

/// Editable contact fields, all optional so PATCH semantics fall out of
/// COALESCE
pub struct ProfileUpdate<'a> {
    pub display_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub tax_id: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

/// Update contact details for a profile
pub async fn update_details<'e, E>(
    executor: E,
    id: &str,
    update: ProfileUpdate<'_>,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET display_name = COALESCE($2, display_name),
            phone = COALESCE($3, phone),
            tax_id = COALESCE($4, tax_id),
            avatar_url = COALESCE($5, avatar_url)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(update.display_name)
    .bind(update.phone)
    .bind(update.tax_id)
    .bind(update.avatar_url)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
