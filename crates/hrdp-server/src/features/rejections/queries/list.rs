//! List rejections query
//!
//! Paginated audit listing over the `dq_rejections` ledger, filterable by
//! run, table and reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use crate::api::response::PaginationMeta;

const DEFAULT_PER_PAGE: i64 = 50;
const MAX_PER_PAGE: i64 = 500;

/// Query parameters for the audit listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRejectionsQuery {
    pub run_id: Option<String>,
    pub table: Option<String>,
    pub reason: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One ledger row surfaced for audit
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RejectionRecord {
    pub run_id: String,
    pub row_hash: String,
    pub source: String,
    pub table_name: String,
    pub reason: String,
    pub row_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Listing plus pagination metadata
#[derive(Debug, Serialize)]
pub struct ListRejectionsResponse {
    pub items: Vec<RejectionRecord>,
    pub pagination: PaginationMeta,
}

/// Errors that can occur when listing rejections
#[derive(Debug, Error)]
pub enum ListRejectionsError {
    #[error("page must be >= 1")]
    InvalidPage,

    #[error("per_page must be between 1 and {MAX_PER_PAGE}")]
    InvalidPerPage,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a ListRejectionsQuery) {
    if let Some(ref run_id) = query.run_id {
        builder.push(" AND run_id = ");
        builder.push_bind(run_id);
    }
    if let Some(ref table) = query.table {
        builder.push(" AND table_name = ");
        builder.push_bind(table);
    }
    if let Some(ref reason) = query.reason {
        builder.push(" AND reason = ");
        builder.push_bind(reason);
    }
}

/// Handler function for the audit listing.
#[tracing::instrument(skip(pool, query), fields(run_id = ?query.run_id, table = ?query.table))]
pub async fn handle(
    pool: PgPool,
    query: ListRejectionsQuery,
) -> Result<ListRejectionsResponse, ListRejectionsError> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if page < 1 {
        return Err(ListRejectionsError::InvalidPage);
    }
    if per_page < 1 || per_page > MAX_PER_PAGE {
        return Err(ListRejectionsError::InvalidPerPage);
    }

    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM dq_rejections WHERE 1=1");
    push_filters(&mut count_builder, &query);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&pool)
        .await?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT run_id, row_hash, source, table_name, reason, row_data, created_at \
         FROM dq_rejections WHERE 1=1",
    );
    push_filters(&mut builder, &query);
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(per_page);
    builder.push(" OFFSET ");
    builder.push_bind((page - 1) * per_page);

    let items = builder
        .build_query_as::<RejectionRecord>()
        .fetch_all(&pool)
        .await?;

    Ok(ListRejectionsResponse {
        items,
        pagination: PaginationMeta::new(page, per_page, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        assert!(DEFAULT_PER_PAGE >= 1 && DEFAULT_PER_PAGE <= MAX_PER_PAGE);
    }

    #[test]
    fn test_query_deserializes_from_empty_params() {
        let query: ListRejectionsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.run_id.is_none());
        assert!(query.page.is_none());
    }

    #[test]
    fn test_rejection_record_serializes_row_data_verbatim() {
        let record = RejectionRecord {
            run_id: "run".to_string(),
            row_hash: "abc".to_string(),
            source: "departments.csv".to_string(),
            table_name: "departments".to_string(),
            reason: "invalid_id".to_string(),
            row_data: serde_json::json!({"id": "x", "department": "Sales"}),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["row_data"]["id"], "x");
        assert_eq!(json["reason"], "invalid_id");
    }
}
