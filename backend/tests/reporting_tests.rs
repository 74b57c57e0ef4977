//! Reporting tests
//!
//! Carry-forward period reports, stock levels and financial charts.

mod common;

use std::sync::Arc;

use common::*;
use inventory_backend::services::reporting::QuantityRow;
use inventory_backend::services::ReportingService;
use inventory_backend::MemoryLedger;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{Direction, EntityFilter, Resolution};

fn quantity_row(date: &str, opening: i64, qty_in: i64, qty_out: i64, closing: i64) -> QuantityRow {
    QuantityRow {
        start_of_period: date.to_string(),
        end_of_period: date.to_string(),
        qty_opening: Decimal::from(opening),
        qty_in: Decimal::from(qty_in),
        qty_out: Decimal::from(qty_out),
        qty_closing: Decimal::from(closing),
    }
}

// ============================================================================
// Quantity Reports
// ============================================================================

#[tokio::test]
async fn test_daily_quantities_before_any_movement() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .generate_report(
            day(2021, 2, 1),
            day(2021, 2, 2),
            Resolution::Day,
            Some(EntityFilter::from(&yard.alu_cooler)),
        )
        .await
        .unwrap();

    assert_eq!(
        report,
        vec![
            quantity_row("2021-02-01", 0, 0, 0, 0),
            quantity_row("2021-02-02", 0, 0, 0, 0),
        ]
    );
}

#[tokio::test]
async fn test_daily_quantities_across_a_receipt() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .generate_report(
            day(2021, 2, 2),
            day(2021, 2, 4),
            Resolution::Day,
            Some(EntityFilter::from(&yard.alu_cooler)),
        )
        .await
        .unwrap();

    assert_eq!(
        report,
        vec![
            quantity_row("2021-02-02", 0, 0, 0, 0),
            quantity_row("2021-02-03", 0, 8, 0, 8),
            quantity_row("2021-02-04", 8, 0, 0, 8),
        ]
    );
}

#[tokio::test]
async fn test_daily_quantities_go_negative_on_issue() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .generate_report(
            day(2021, 4, 4),
            day(2021, 4, 6),
            Resolution::Day,
            Some(EntityFilter::from(&yard.steel_can)),
        )
        .await
        .unwrap();

    assert_eq!(
        report,
        vec![
            quantity_row("2021-04-04", 0, 0, 0, 0),
            quantity_row("2021-04-05", 0, 0, 25, -25),
            quantity_row("2021-04-06", -25, 0, 0, -25),
        ]
    );
}

#[tokio::test]
async fn test_opening_includes_movements_just_before_the_window() {
    let mut ledger = MemoryLedger::new();
    let group = ledger.add_group("aluminium");
    let can = ledger.add_material("alu can", &group);
    // late on the previous day
    weighing(
        &mut ledger,
        Direction::In,
        &can,
        end_of_day(2021, 2, 2),
        "5",
        "0",
        "1",
    );

    let reporting = ReportingService::new(Arc::new(ledger));
    let report = reporting
        .generate_report(day(2021, 2, 3), day(2021, 2, 3), Resolution::Day, None)
        .await
        .unwrap();
    assert_eq!(report, vec![quantity_row("2021-02-03", 5, 0, 0, 5)]);
}

// ============================================================================
// Summary Report
// ============================================================================

#[tokio::test]
async fn test_summary_prices_and_values() {
    let (ledger, wire) = averaging_ledger();
    let reporting = ReportingService::new(ledger);

    let report = reporting
        .summary_report(
            day(2021, 6, 1),
            day(2021, 6, 4),
            Resolution::Day,
            Some(EntityFilter::from(&wire)),
        )
        .await
        .unwrap();
    assert_eq!(report.len(), 4);

    let first = &report[0];
    assert_eq!(first.qty_opening, Decimal::ZERO);
    assert_eq!(first.qty_in, dec("30"));
    assert_eq!(first.price_in, dec("10"));
    assert_eq!(first.val_in, dec("300"));
    assert_eq!(first.price_closing, dec("10"));

    let issue = &report[2];
    assert_eq!(issue.qty_opening, dec("100"));
    assert_eq!(issue.qty_out, dec("50"));
    assert_eq!(issue.price_out, dec("30"));
    assert_eq!(issue.val_out, dec("1500"));
    assert_eq!(issue.qty_closing, dec("50"));
    assert_eq!(issue.price_closing, dec("10"));
    assert_eq!(issue.val_closing, dec("500"));

    let last = &report[3];
    assert_eq!(last.qty_closing, dec("200"));
    assert_eq!(last.price_opening, dec("10"));
    assert_eq!(last.price_in, dec("15"));
    assert_eq!(last.price_closing, dec("13.75"));
    assert_eq!(last.val_closing, dec("2750"));
}

#[tokio::test]
async fn test_summary_monthly_labels() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .summary_report(day(2021, 2, 10), day(2021, 4, 2), Resolution::Month, None)
        .await
        .unwrap();

    let labels: Vec<(&str, &str)> = report
        .iter()
        .map(|r| (r.start_of_period.as_str(), r.end_of_period.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("2021-02-01", "2021-02-28"),
            ("2021-03-01", "2021-03-31"),
            ("2021-04-01", "2021-04-30"),
        ]
    );
    assert_eq!(report[2].qty_out, dec("25"));
    assert_eq!(report[2].qty_closing, dec("-1"));
}

#[tokio::test]
async fn test_summary_of_inverted_window_is_empty() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());
    let report = reporting
        .summary_report(day(2021, 3, 1), day(2021, 2, 1), Resolution::Day, None)
        .await
        .unwrap();
    assert!(report.is_empty());
}

// ============================================================================
// Stock Levels and Financials
// ============================================================================

#[tokio::test]
async fn test_stock_levels_per_material() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .stock_level_report(day(2021, 2, 2), day(2021, 2, 4), false)
        .await
        .unwrap();

    assert_eq!(report.dates, vec!["2021-02-02", "2021-02-03", "2021-02-04"]);
    let names: Vec<&str> = report.series.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["alu can", "alu cooler", "steel can"]);
    assert_eq!(report.series[1].1, vec![dec("0"), dec("8"), dec("8")]);
    assert_eq!(report.series[2].1, vec![dec("0"), dec("0"), dec("0")]);
}

#[tokio::test]
async fn test_stock_levels_per_group() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .stock_level_report(day(2021, 4, 4), day(2021, 4, 5), true)
        .await
        .unwrap();

    assert_eq!(report.series[0].0, "aluminium");
    assert_eq!(report.series[0].1, vec![dec("24"), dec("24")]);
    assert_eq!(report.series[1].0, "steel");
    assert_eq!(report.series[1].1, vec![dec("0"), dec("-25")]);

    let json = serde_json::to_value(&report).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert!(keys.iter().any(|k| *k == "dates"));
    assert!(keys.iter().any(|k| *k == "steel"));
}

#[tokio::test]
async fn test_weekly_financials() {
    let mut ledger = MemoryLedger::new();
    let group = ledger.add_group("aluminium");
    let can = ledger.add_material("alu can", &group);
    weighing(&mut ledger, Direction::In, &can, day(2021, 7, 8), "10", "2", "5");
    weighing(&mut ledger, Direction::Out, &can, day(2021, 7, 20), "4", "0", "12.5");

    let reporting = ReportingService::new(Arc::new(ledger));
    let report = reporting
        .weekly_sales_and_purchases_report(day(2021, 7, 8), day(2021, 7, 20))
        .await
        .unwrap();

    assert_eq!(report.week, vec!["W27", "W28", "W29"]);
    assert_eq!(report.sales, vec![dec("0"), dec("0"), dec("50")]);
    assert_eq!(report.purchases, vec![dec("-40"), dec("0"), dec("0")]);
}

#[tokio::test]
async fn test_sales_and_purchases_per_material() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .sales_and_purchases_report(day(2021, 2, 1), end_of_day(2021, 4, 30), false, false)
        .await
        .unwrap();

    assert_eq!(report.item, vec!["alu can", "alu cooler", "steel can"]);
    assert_eq!(report.sales, vec![dec("0"), dec("0"), dec("375")]);
    assert_eq!(report.purchases, vec![dec("160"), dec("40"), dec("0")]);
}

#[tokio::test]
async fn test_sales_and_purchases_per_group_normalized() {
    let yard = Scrapyard::new();
    let reporting = ReportingService::new(yard.shared());

    let report = reporting
        .sales_and_purchases_report(day(2021, 2, 1), end_of_day(2021, 4, 30), true, true)
        .await
        .unwrap();

    assert_eq!(report.item, vec!["aluminium", "steel"]);
    assert_eq!(report.sales, vec![dec("0"), dec("1")]);
    assert_eq!(report.purchases, vec![dec("1"), dec("0")]);

    // nothing sold or bought in January
    let january = reporting
        .sales_and_purchases_report(day(2021, 1, 1), end_of_day(2021, 1, 31), true, true)
        .await
        .unwrap();
    assert_eq!(january.item.len(), 2);
    assert!(january.sales.is_empty());
    assert!(january.purchases.is_empty());
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn resolution_strategy() -> impl Strategy<Value = Resolution> {
    prop_oneof![
        Just(Resolution::Day),
        Just(Resolution::Week),
        Just(Resolution::Month),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Each period opens with the previous period's closing quantity and price
    #[test]
    fn prop_summary_periods_chain(
        movements in prop::collection::vec(
            (any::<bool>(), 0i64..120, 1u32..50_000, 1u32..5_000),
            0..25,
        ),
        start_offset in 0i64..60,
        span in 0i64..90,
        resolution in resolution_strategy(),
    ) {
        let mut ledger = MemoryLedger::new();
        let group = ledger.add_group("aluminium");
        let can = ledger.add_material("alu can", &group);
        for (inbound, offset, weight, price) in &movements {
            let direction = if *inbound { Direction::In } else { Direction::Out };
            weighing(
                &mut ledger,
                direction,
                &can,
                day(2021, 1, 1) + chrono::Duration::hours(*offset * 13),
                &format!("{}.{:02}", weight / 100, weight % 100),
                "0",
                &format!("{}.{:02}", price / 100, price % 100),
            );
        }

        let reporting = ReportingService::new(Arc::new(ledger));
        let from = day(2021, 1, 1) + chrono::Duration::days(start_offset);
        let to = from + chrono::Duration::days(span);
        let report = block_on(reporting.summary_report(from, to, resolution, None)).unwrap();

        prop_assert!(!report.is_empty());
        for row in &report {
            prop_assert_eq!(row.qty_closing, row.qty_opening + row.qty_in - row.qty_out);
        }
        for pair in report.windows(2) {
            prop_assert_eq!(pair[0].qty_closing, pair[1].qty_opening);
            prop_assert_eq!(pair[0].price_closing, pair[1].price_opening);
            prop_assert_eq!(pair[0].val_closing, pair[1].val_opening);
        }
    }
}
