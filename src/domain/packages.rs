//! Credit package domain - DB queries for the package catalog

use sqlx::{Executor, Postgres};

use crate::models::CreditPackage;

/// Tier flag selecting the packages shown in the store
const STORE_TIER: i32 = 3;

const PACKAGE_COLUMNS: &str = "id, name, price, credits, popular, best_value";

/// List store packages, cheapest first
pub async fn list<'e, E>(executor: E) -> Result<Vec<CreditPackage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM credit_packages WHERE tipo_acesso = $1 ORDER BY price ASC"
    ))
    .bind(STORE_TIER)
    .fetch_all(executor)
    .await
}

/// Fetch one package (still tier-filtered so hidden packages stay hidden)
pub async fn get<'e, E>(executor: E, id: &str) -> Result<Option<CreditPackage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM credit_packages WHERE id = $1 AND tipo_acesso = $2"
    ))
    .bind(id)
    .bind(STORE_TIER)
    .fetch_optional(executor)
    .await
}
