//! Reporting service for period summaries, stock levels and financial charts
//!
//! Reports walk the buckets of [`shared::datetime_range`] and carry each
//! bucket's closing figures forward as the next bucket's opening figures.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use shared::{datetime_range, normalized, Direction, EntityFilter, Resolution};

use crate::error::{AppError, AppResult};
use crate::ledger::Ledger;
use crate::services::valuation::ValuationService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    ledger: Arc<dyn Ledger>,
    valuation: ValuationService,
}

/// One bucket of the summary report: quantities, prices and values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub start_of_period: String,
    pub end_of_period: String,
    pub qty_opening: Decimal,
    pub qty_in: Decimal,
    pub qty_out: Decimal,
    pub qty_closing: Decimal,
    pub price_opening: Decimal,
    pub price_in: Decimal,
    pub price_out: Decimal,
    pub price_closing: Decimal,
    pub val_opening: Decimal,
    pub val_in: Decimal,
    pub val_out: Decimal,
    pub val_closing: Decimal,
}

/// One bucket of the quantity-only report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityRow {
    pub start_of_period: String,
    pub end_of_period: String,
    pub qty_opening: Decimal,
    pub qty_in: Decimal,
    pub qty_out: Decimal,
    pub qty_closing: Decimal,
}

/// Daily closing balance per entity.
///
/// Serializes as `{"dates": [...], "<entity name>": [...], ...}` with the
/// series in entity order. A name already taken by an earlier key gets a
/// ` (2)`, ` (3)`, ... suffix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLevelReport {
    pub dates: Vec<String>,
    pub series: Vec<(String, Vec<Decimal>)>,
}

impl StockLevelReport {
    /// Map keys for `series`, unique among themselves and against `dates`
    pub fn series_keys(&self) -> Vec<String> {
        let mut taken: HashSet<String> = HashSet::from(["dates".to_string()]);
        self.series
            .iter()
            .map(|(name, _)| {
                let mut key = name.clone();
                let mut n = 2;
                while taken.contains(&key) {
                    key = format!("{} ({})", name, n);
                    n += 1;
                }
                taken.insert(key.clone());
                key
            })
            .collect()
    }
}

impl Serialize for StockLevelReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry("dates", &self.dates)?;
        for (key, (_, balances)) in self.series_keys().iter().zip(&self.series) {
            map.serialize_entry(key, balances)?;
        }
        map.end()
    }
}

/// Weekly sales and purchases chart data. Purchases keep their cost sign.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyFinancials {
    pub week: Vec<String>,
    pub sales: Vec<Decimal>,
    pub purchases: Vec<Decimal>,
}

/// Sales and purchases per material or material group over one window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialBreakdown {
    pub item: Vec<String>,
    pub sales: Vec<Decimal>,
    pub purchases: Vec<Decimal>,
}

// Carried from one bucket into the next
#[derive(Debug, Clone, Copy)]
struct Closing {
    qty: Decimal,
    price: Decimal,
}

// 2 places, and never a negative zero
fn emit(value: Decimal) -> Decimal {
    value.round_dp(2).normalize()
}

impl ReportingService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            valuation: ValuationService::new(ledger.clone()),
            ledger,
        }
    }

    /// Opening/in/out/closing quantities, prices and values per bucket
    pub async fn summary_report(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        resolution: Resolution,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Vec<SummaryRow>> {
        tracing::debug!(%date_from, %date_to, %resolution, ?filter_by, "Building summary report");

        let mut previous: Option<Closing> = None;
        let mut report = Vec::new();

        for period in datetime_range(date_from, date_to, resolution) {
            let opening = match previous {
                Some(closing) => closing,
                None => {
                    let before = period.before_start();
                    let (qty, price) = tokio::try_join!(
                        self.valuation.balance(before, filter_by),
                        self.valuation.weighted_avg_price(before, filter_by),
                    )?;
                    Closing { qty, price }
                }
            };

            let (qty_in, qty_out, price_in, price_out, price_closing) = tokio::try_join!(
                self.valuation
                    .movement_between(Direction::In, period.start, period.end, filter_by),
                self.valuation
                    .movement_between(Direction::Out, period.start, period.end, filter_by),
                self.valuation
                    .period_weighted_avg_price(Direction::In, period.start, period.end, filter_by),
                self.valuation
                    .period_weighted_avg_price(Direction::Out, period.start, period.end, filter_by),
                self.valuation.weighted_avg_price(period.end, filter_by),
            )?;
            let qty_closing = opening.qty + qty_in - qty_out;

            report.push(SummaryRow {
                start_of_period: period.start_label(),
                end_of_period: period.end_label(),
                qty_opening: emit(opening.qty),
                qty_in: emit(qty_in),
                qty_out: emit(qty_out),
                qty_closing: emit(qty_closing),
                price_opening: emit(opening.price),
                price_in: emit(price_in),
                price_out: emit(price_out),
                price_closing: emit(price_closing),
                val_opening: emit(opening.qty * opening.price),
                val_in: emit(qty_in * price_in),
                val_out: emit(qty_out * price_out),
                val_closing: emit(qty_closing * price_closing),
            });

            previous = Some(Closing {
                qty: qty_closing,
                price: price_closing,
            });
        }

        Ok(report)
    }

    /// Quantity-only variant of [`Self::summary_report`]
    pub async fn generate_report(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        resolution: Resolution,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Vec<QuantityRow>> {
        tracing::debug!(%date_from, %date_to, %resolution, ?filter_by, "Building quantity report");

        let mut qty_closing: Option<Decimal> = None;
        let mut report = Vec::new();

        for period in datetime_range(date_from, date_to, resolution) {
            let qty_opening = match qty_closing {
                Some(qty) => qty,
                None => {
                    self.valuation
                        .balance(period.before_start(), filter_by)
                        .await?
                }
            };
            let (qty_in, qty_out) = tokio::try_join!(
                self.valuation
                    .movement_between(Direction::In, period.start, period.end, filter_by),
                self.valuation
                    .movement_between(Direction::Out, period.start, period.end, filter_by),
            )?;
            let closing = qty_opening + qty_in - qty_out;

            report.push(QuantityRow {
                start_of_period: period.start_label(),
                end_of_period: period.end_label(),
                qty_opening: emit(qty_opening),
                qty_in: emit(qty_in),
                qty_out: emit(qty_out),
                qty_closing: emit(closing),
            });
            qty_closing = Some(closing);
        }

        Ok(report)
    }

    /// Balance at the end of every day, one series per material or material group
    pub async fn stock_level_report(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        by_material_group: bool,
    ) -> AppResult<StockLevelReport> {
        tracing::debug!(%date_from, %date_to, by_material_group, "Building stock level report");

        let entities: Vec<(String, EntityFilter)> = if by_material_group {
            self.ledger
                .material_groups()
                .await?
                .iter()
                .map(|g| (g.name.clone(), EntityFilter::from(g)))
                .collect()
        } else {
            self.ledger
                .materials(None)
                .await?
                .iter()
                .map(|m| (m.name.clone(), EntityFilter::from(m)))
                .collect()
        };

        let periods = datetime_range(date_from, date_to, Resolution::Day);
        let mut report = StockLevelReport {
            dates: periods.clone().map(|p| p.start_label()).collect(),
            series: Vec::with_capacity(entities.len()),
        };

        for (name, filter) in entities {
            let mut balances = Vec::with_capacity(report.dates.len());
            for period in periods.clone() {
                let balance = self.valuation.balance(period.end, Some(filter)).await?;
                balances.push(emit(balance));
            }
            report.series.push((name, balances));
        }

        Ok(report)
    }

    /// Sales and purchases per ISO week, labelled `W<week number>`
    pub async fn weekly_sales_and_purchases_report(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> AppResult<WeeklyFinancials> {
        tracing::debug!(%date_from, %date_to, "Building weekly financials");

        let mut report = WeeklyFinancials::default();
        for period in datetime_range(date_from, date_to, Resolution::Week) {
            let totals = self
                .valuation
                .sales_and_purchases(period.start, period.end, None)
                .await?;
            report.week.push(format!("W{}", period.start.iso_week().week()));
            report.sales.push(emit(totals.sales));
            report.purchases.push(emit(totals.purchases));
        }
        Ok(report)
    }

    /// Sales and purchase magnitudes per material group, or per material
    /// ordered by group then material name.
    ///
    /// With `normalize` each list is replaced by its shares of the list total.
    pub async fn sales_and_purchases_report(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        by_material_group: bool,
        normalize: bool,
    ) -> AppResult<FinancialBreakdown> {
        tracing::debug!(
            %date_from, %date_to, by_material_group, normalize,
            "Building sales and purchases breakdown"
        );

        let groups = self.ledger.material_groups().await?;
        let mut entities: Vec<(String, EntityFilter)> = Vec::new();
        for group in &groups {
            if by_material_group {
                entities.push((group.name.clone(), EntityFilter::from(group)));
            } else {
                let materials = self.ledger.materials(Some(group.id)).await?;
                entities.extend(
                    materials
                        .iter()
                        .map(|m| (m.name.clone(), EntityFilter::from(m))),
                );
            }
        }

        let mut report = FinancialBreakdown::default();
        for (name, filter) in entities {
            let totals = self
                .valuation
                .sales_and_purchases(date_from, date_to, Some(filter))
                .await?;
            report.item.push(name);
            report.sales.push(totals.sales);
            report.purchases.push((-totals.purchases).normalize());
        }

        if normalize {
            report.sales = normalized(&report.sales);
            report.purchases = normalized(&report.purchases);
        } else {
            report.sales = report.sales.into_iter().map(emit).collect();
            report.purchases = report.purchases.into_iter().map(emit).collect();
        }

        Ok(report)
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
