//! PostgreSQL-backed ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{Direction, Material, MaterialGroup, Transaction, TransactionListing};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{Ledger, LedgerQuery, LedgerTotals, Movement, TransactionFilter};
use crate::error::{AppError, AppResult};

/// Ledger reading the `transactions`, `materials` and `material_groups` tables
#[derive(Clone)]
pub struct PgLedger {
    db: PgPool,
}

/// Row for movement replay
#[derive(Debug, FromRow)]
struct MovementRow {
    transaction_type: String,
    transaction_time: DateTime<Utc>,
    net_weight: Decimal,
    unit_price: Decimal,
}

/// Row for the transaction listing
#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    transaction_type: String,
    material_id: Uuid,
    material_name: String,
    material_group_name: String,
    transaction_time: DateTime<Utc>,
    gross_weight: Decimal,
    tare_weight: Decimal,
    unit_price: Decimal,
    notes: String,
}

// Shared WHERE clause for aggregate queries; binds $1..$5
const SELECTION: &str = r#"
    FROM transactions t
    JOIN materials m ON m.id = t.material_id
    WHERE ($1::text IS NULL OR t.transaction_type = $1)
      AND ($2::uuid IS NULL OR t.material_id = $2)
      AND ($3::uuid IS NULL OR m.material_group_id = $3)
      AND ($4::timestamptz IS NULL OR t.transaction_time >= $4)
      AND ($5::timestamptz IS NULL OR t.transaction_time <= $5)
"#;

impl PgLedger {
    /// Create a new PgLedger instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn parse_direction(value: &str) -> AppResult<Direction> {
    value
        .parse()
        .map_err(|e: shared::ParseDirectionError| AppError::Internal(e.to_string()))
}

#[async_trait]
impl Ledger for PgLedger {
    async fn totals(&self, query: &LedgerQuery) -> AppResult<LedgerTotals> {
        // Net values round half-to-even per weighing, so the fold happens here
        let sql = format!(
            r#"
            SELECT t.gross_weight, t.tare_weight, t.unit_price
            {SELECTION}
            "#
        );

        let rows = sqlx::query_as::<_, (Decimal, Decimal, Decimal)>(&sql)
            .bind(query.direction.map(|d| d.as_str()))
            .bind(query.filter.and_then(|f| f.material_id()))
            .bind(query.filter.and_then(|f| f.material_group_id()))
            .bind(query.start_time)
            .bind(query.end_time)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .fold(LedgerTotals::default(), |acc, (gross, tare, price)| {
                acc.add(gross, tare, price)
            }))
    }

    async fn movements(&self, query: &LedgerQuery) -> AppResult<Vec<Movement>> {
        let sql = format!(
            r#"
            SELECT t.transaction_type, t.transaction_time,
                   t.gross_weight - t.tare_weight AS net_weight, t.unit_price
            {SELECTION}
            ORDER BY t.transaction_time ASC, t.created_time ASC
            "#
        );

        let rows = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(query.direction.map(|d| d.as_str()))
            .bind(query.filter.and_then(|f| f.material_id()))
            .bind(query.filter.and_then(|f| f.material_group_id()))
            .bind(query.start_time)
            .bind(query.end_time)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(Movement {
                    direction: parse_direction(&r.transaction_type)?,
                    timestamp: r.transaction_time,
                    net_weight: r.net_weight,
                    unit_price: r.unit_price,
                })
            })
            .collect()
    }

    async fn material_groups(&self) -> AppResult<Vec<MaterialGroup>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM material_groups ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| MaterialGroup { id, name })
            .collect())
    }

    async fn materials(&self, material_group_id: Option<Uuid>) -> AppResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Uuid)>(
            r#"
            SELECT id, name, material_group_id
            FROM materials
            WHERE ($1::uuid IS NULL OR material_group_id = $1)
            ORDER BY name
            "#,
        )
        .bind(material_group_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, material_group_id)| Material {
                id,
                name,
                material_group_id,
            })
            .collect())
    }

    async fn find_material_group(&self, id: Uuid) -> AppResult<Option<MaterialGroup>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM material_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, name)| MaterialGroup { id, name }))
    }

    async fn find_material(&self, id: Uuid) -> AppResult<Option<Material>> {
        let row = sqlx::query_as::<_, (Uuid, String, Uuid)>(
            "SELECT id, name, material_group_id FROM materials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, name, material_group_id)| Material {
            id,
            name,
            material_group_id,
        }))
    }

    async fn transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionListing>> {
        let directions: Option<Vec<String>> = filter
            .directions
            .as_ref()
            .map(|dirs| dirs.iter().map(|d| d.as_str().to_string()).collect());

        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT t.id, t.transaction_type, t.material_id, m.name AS material_name,
                   g.name AS material_group_name, t.transaction_time,
                   t.gross_weight, t.tare_weight, t.unit_price, t.notes
            FROM transactions t
            JOIN materials m ON m.id = t.material_id
            JOIN material_groups g ON g.id = m.material_group_id
            WHERE ($1::text[] IS NULL OR t.transaction_type = ANY($1))
              AND ($2::uuid IS NULL OR m.material_group_id = $2)
              AND ($3::uuid IS NULL OR t.material_id = $3)
              AND ($4::timestamptz IS NULL OR t.transaction_time >= $4)
              AND ($5::timestamptz IS NULL OR t.transaction_time <= $5)
            ORDER BY t.transaction_time DESC
            "#,
        )
        .bind(directions)
        .bind(filter.material_group_id)
        .bind(filter.material_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|r| {
                let transaction = Transaction {
                    id: r.id,
                    direction: parse_direction(&r.transaction_type)?,
                    material_id: r.material_id,
                    timestamp: r.transaction_time,
                    gross_weight: r.gross_weight,
                    tare_weight: r.tare_weight,
                    unit_price: r.unit_price,
                    notes: r.notes,
                };
                Ok(TransactionListing::new(
                    &transaction,
                    &r.material_group_name,
                    &r.material_name,
                ))
            })
            .collect()
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }
}
