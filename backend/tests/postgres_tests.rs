//! PostgreSQL ledger tests
//!
//! These need a database: set `DATABASE_URL` and run
//! `cargo test -p inventory-backend --test postgres_tests -- --ignored`.
//! Each test gets a fresh migrated database.

use chrono::{DateTime, TimeZone, Utc};
use inventory_backend::ledger::{Ledger, LedgerQuery, TransactionFilter};
use inventory_backend::PgLedger;
use rust_decimal::Decimal;
use shared::{Direction, EntityFilter};
use sqlx::PgPool;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

async fn insert_group(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO material_groups (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_material(pool: &PgPool, name: &str, group: Uuid) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO materials (name, material_group_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(group)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_weighing(
    pool: &PgPool,
    direction: Direction,
    material: Uuid,
    at: DateTime<Utc>,
    gross: &str,
    tare: &str,
    price: &str,
) {
    sqlx::query(
        r#"
        INSERT INTO transactions
            (transaction_type, material_id, transaction_time, gross_weight, tare_weight, unit_price)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(direction.as_str())
    .bind(material)
    .bind(at)
    .bind(dec(gross))
    .bind(dec(tare))
    .bind(dec(price))
    .execute(pool)
    .await
    .unwrap();
}

// ============================================================================
// Aggregates
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn test_half_cent_values_round_to_even(pool: PgPool) {
    let group = insert_group(&pool, "aluminium").await;
    let can = insert_material(&pool, "alu can", group).await;
    insert_weighing(&pool, Direction::Out, can, day(2021, 2, 3), "0.25", "0", "0.50").await;
    insert_weighing(&pool, Direction::Out, can, day(2021, 2, 4), "1.75", "1.00", "0.50").await;

    let ledger = PgLedger::new(pool);
    let first = ledger
        .totals(&LedgerQuery::until(day(2021, 2, 3)).with_direction(Direction::Out))
        .await
        .unwrap();
    assert_eq!(first.net_value, dec("0.12"));

    let both = ledger
        .totals(&LedgerQuery::until(day(2021, 2, 4)).with_direction(Direction::Out))
        .await
        .unwrap();
    assert_eq!(both.net_weight, dec("1.00"));
    assert_eq!(both.net_value, dec("0.50"));
    assert_eq!(both.weighted_price, dec("0.5"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn test_totals_select_by_group_material_and_window(pool: PgPool) {
    let aluminium = insert_group(&pool, "aluminium").await;
    let steel = insert_group(&pool, "steel").await;
    let cooler = insert_material(&pool, "alu cooler", aluminium).await;
    let can = insert_material(&pool, "alu can", aluminium).await;
    let steel_can = insert_material(&pool, "steel can", steel).await;
    insert_weighing(&pool, Direction::In, cooler, day(2021, 2, 3), "10", "2", "5").await;
    insert_weighing(&pool, Direction::In, can, day(2021, 3, 4), "20", "4", "10").await;
    insert_weighing(&pool, Direction::Out, steel_can, day(2021, 4, 5), "30", "5", "15").await;

    let ledger = PgLedger::new(pool);
    let group = EntityFilter::MaterialGroup(aluminium);
    let received = ledger
        .totals(&LedgerQuery::until(day(2021, 4, 30)).with_filter(Some(group)))
        .await
        .unwrap();
    assert_eq!(received.net_weight, dec("24"));
    assert_eq!(received.net_value, dec("200"));

    let window = ledger
        .totals(&LedgerQuery::between(day(2021, 3, 4), day(2021, 4, 5)))
        .await
        .unwrap();
    assert_eq!(window.net_weight, dec("41"));

    let none = ledger
        .totals(
            &LedgerQuery::until(day(2021, 4, 30))
                .with_filter(Some(EntityFilter::Material(steel_can)))
                .with_direction(Direction::In),
        )
        .await
        .unwrap();
    assert_eq!(none.net_weight, Decimal::ZERO);
    assert_eq!(none.net_value, Decimal::ZERO);

    let movements = ledger.movements(&LedgerQuery::until(day(2021, 4, 30))).await.unwrap();
    let order: Vec<Direction> = movements.iter().map(|m| m.direction).collect();
    assert_eq!(order, vec![Direction::In, Direction::In, Direction::Out]);
    assert_eq!(movements[2].net_weight, dec("25"));
}

// ============================================================================
// Catalogue and Listing
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn test_listing_filters_and_order(pool: PgPool) {
    let aluminium = insert_group(&pool, "aluminium").await;
    let steel = insert_group(&pool, "steel").await;
    let can = insert_material(&pool, "alu can", aluminium).await;
    let steel_can = insert_material(&pool, "steel can", steel).await;
    insert_weighing(&pool, Direction::In, can, day(2021, 3, 4), "20", "4", "10").await;
    insert_weighing(&pool, Direction::Out, steel_can, day(2021, 4, 5), "30", "5", "15").await;
    insert_weighing(&pool, Direction::Out, can, day(2021, 5, 6), "3", "1", "2").await;

    let ledger = PgLedger::new(pool);
    let all = ledger.transactions(&TransactionFilter::default()).await.unwrap();
    let dates: Vec<&str> = all.iter().map(|t| &t.transaction_time[..10]).collect();
    assert_eq!(dates, vec!["2021-05-06", "2021-04-05", "2021-03-04"]);
    assert_eq!(all[1].material_group, "steel");

    let outbound_alu = ledger
        .transactions(&TransactionFilter {
            directions: Some(vec![Direction::Out]),
            material_group_id: Some(aluminium),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(outbound_alu.len(), 1);
    assert_eq!(outbound_alu[0].net_value, dec("4"));

    let nothing = ledger
        .transactions(&TransactionFilter {
            directions: Some(vec![]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(nothing.is_empty());

    let names: Vec<String> = ledger
        .materials(None)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["alu can", "steel can"]);
    assert!(ledger.find_material_group(steel).await.unwrap().is_some());
    assert!(ledger.ping().await);
}
