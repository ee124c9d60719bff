//! Database queries for quotes.
//!
//! Items and cached totals are only ever written together, in one
//! statement, together with a version bump.

use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ClientSnapshot, Quote, QuoteItem, QuoteRecord, QuoteStatus};
use crate::pricing::calculators::QuoteTotals;

const QUOTE_COLUMNS: &str = "id, number, issue_date, client_id, client_name, client_phone, \
     client_email, client_address, site_address, status, items, total_net, total_vat, \
     total_gross, version, created_at, updated_at";

/// List quotes, newest number first
pub async fn list_quotes(pool: &PgPool) -> Result<Vec<Quote>> {
    let records = sqlx::query_as::<_, QuoteRecord>(&format!(
        "SELECT {} FROM quotes ORDER BY number DESC",
        QUOTE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    records.into_iter().map(QuoteRecord::into_quote).collect()
}

pub async fn get_quote(pool: &PgPool, id: Uuid) -> Result<Quote> {
    sqlx::query_as::<_, QuoteRecord>(&format!(
        "SELECT {} FROM quotes WHERE id = $1",
        QUOTE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Quote {}", id)))?
    .into_quote()
}

/// Insert a new draft quote. The display number comes from `quote_number_seq`.
pub async fn insert_quote(
    pool: &PgPool,
    issue_date: NaiveDate,
    client: &ClientSnapshot,
    site_address: &str,
    items: &[QuoteItem],
    totals: &QuoteTotals,
) -> Result<Quote> {
    sqlx::query_as::<_, QuoteRecord>(&format!(
        r#"
        INSERT INTO quotes (
            id, issue_date, client_id, client_name, client_phone, client_email,
            client_address, site_address, status, items,
            total_net, total_vat, total_gross, version
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 1)
        RETURNING {}
        "#,
        QUOTE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(issue_date)
    .bind(client.client_id)
    .bind(&client.name)
    .bind(&client.phone)
    .bind(&client.email)
    .bind(&client.address)
    .bind(site_address)
    .bind(QuoteStatus::Draft.as_str())
    .bind(Json(items))
    .bind(totals.total_net)
    .bind(totals.total_vat)
    .bind(totals.total_gross())
    .fetch_one(pool)
    .await?
    .into_quote()
}

/// Replace items and cached totals in one statement.
///
/// With `expected_version` set, the write only happens if the stored
/// version still matches; otherwise `Conflict` is returned.
pub async fn update_items_and_totals(
    pool: &PgPool,
    id: Uuid,
    items: &[QuoteItem],
    totals: &QuoteTotals,
    expected_version: Option<i32>,
) -> Result<Quote> {
    let updated = sqlx::query_as::<_, QuoteRecord>(&format!(
        r#"
        UPDATE quotes
        SET items = $2,
            total_net = $3,
            total_vat = $4,
            total_gross = $5,
            version = version + 1,
            updated_at = NOW()
        WHERE id = $1
          AND ($6::INTEGER IS NULL OR version = $6)
        RETURNING {}
        "#,
        QUOTE_COLUMNS
    ))
    .bind(id)
    .bind(Json(items))
    .bind(totals.total_net)
    .bind(totals.total_vat)
    .bind(totals.total_gross())
    .bind(expected_version)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(record) => record.into_quote(),
        None => Err(missing_or_conflict(pool, id, expected_version).await),
    }
}

/// Set a new status, guarded on the status the caller validated against
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    from: QuoteStatus,
    to: QuoteStatus,
) -> Result<Quote> {
    sqlx::query_as::<_, QuoteRecord>(&format!(
        r#"
        UPDATE quotes
        SET status = $3, version = version + 1, updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING {}
        "#,
        QUOTE_COLUMNS
    ))
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("Quote {} changed status concurrently", id)))?
    .into_quote()
}

pub async fn delete_quote(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Quote {}", id)));
    }
    Ok(())
}

async fn missing_or_conflict(pool: &PgPool, id: Uuid, expected_version: Option<i32>) -> AppError {
    let current: std::result::Result<Option<i32>, sqlx::Error> =
        sqlx::query_scalar("SELECT version FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await;

    match current {
        Ok(Some(version)) => AppError::Conflict(format!(
            "Quote {} is at version {}, expected {}",
            id,
            version,
            expected_version.map_or_else(|| "any".to_string(), |v| v.to_string())
        )),
        Ok(None) => AppError::NotFound(format!("Quote {}", id)),
        Err(e) => AppError::Database(e),
    }
}
