//! Stock balance and cost valuation over the transaction ledger
//!
//! Every function here is a read-only aggregate; nothing is cached between
//! calls, so concurrent requests never share state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Direction, EntityFilter};

use crate::error::AppResult;
use crate::ledger::{Ledger, LedgerQuery, Movement};

/// Valuation service computing balances and average prices
#[derive(Clone)]
pub struct ValuationService {
    ledger: Arc<dyn Ledger>,
}

/// Sales and purchases over a window.
///
/// `purchases` carries the cost sign: it is the negated value of inbound goods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesAndPurchases {
    pub sales: Decimal,
    pub purchases: Decimal,
}

/// Running weighted-average cost position.
///
/// Receipts move the average towards their unit price, issues leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverage {
    pub balance: Decimal,
    pub price: Decimal,
}

impl RunningAverage {
    pub fn receive(&mut self, net_weight: Decimal, unit_price: Decimal) {
        let new_balance = self.balance + net_weight;
        // an empty position keeps the last known price
        if !new_balance.is_zero() {
            self.price = (self.balance * self.price + net_weight * unit_price) / new_balance;
        }
        self.balance = new_balance;
    }

    /// Remove stock at the current average
    pub fn issue(&mut self, net_weight: Decimal) {
        self.balance -= net_weight;
    }

    pub fn apply(&mut self, movement: &Movement) {
        match movement.direction {
            Direction::In => self.receive(movement.net_weight, movement.unit_price),
            Direction::Out => self.issue(movement.net_weight),
        }
    }
}

impl ValuationService {
    /// Create a new ValuationService instance
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Net stock as of `as_of`: everything received minus everything issued
    pub async fn balance(
        &self,
        as_of: DateTime<Utc>,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Decimal> {
        let query = LedgerQuery::until(as_of).with_filter(filter_by);
        let inbound = query.clone().with_direction(Direction::In);
        let outbound = query.with_direction(Direction::Out);
        let (received, issued) = tokio::try_join!(
            self.ledger.totals(&inbound),
            self.ledger.totals(&outbound),
        )?;
        Ok(received.net_weight - issued.net_weight)
    }

    /// Net weight moved in one direction within `[date_from, date_to]`
    pub async fn movement_between(
        &self,
        direction: Direction,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Decimal> {
        let query = LedgerQuery::between(date_from, date_to)
            .with_direction(direction)
            .with_filter(filter_by);
        Ok(self.ledger.totals(&query).await?.net_weight)
    }

    /// Value of outbound goods and negated value of inbound goods within `[date_from, date_to]`
    pub async fn sales_and_purchases(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<SalesAndPurchases> {
        let query = LedgerQuery::between(date_from, date_to).with_filter(filter_by);
        let inbound = query.clone().with_direction(Direction::In);
        let outbound = query.with_direction(Direction::Out);
        let (sold, bought) = tokio::try_join!(
            self.ledger.totals(&outbound),
            self.ledger.totals(&inbound),
        )?;
        Ok(SalesAndPurchases {
            sales: sold.net_value,
            purchases: (-bought.net_value).normalize(),
        })
    }

    /// Running weighted-average cost as of `as_of`, replaying every movement in time order
    pub async fn weighted_avg_price(
        &self,
        as_of: DateTime<Utc>,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Decimal> {
        let query = LedgerQuery::until(as_of).with_filter(filter_by);
        let movements = self.ledger.movements(&query).await?;

        let mut position = RunningAverage::default();
        for movement in &movements {
            position.apply(movement);
        }
        Ok(position.price)
    }

    /// Plain weighted average of unit prices for one direction within `[date_from, date_to]`.
    ///
    /// Zero when no weight moved.
    pub async fn period_weighted_avg_price(
        &self,
        direction: Direction,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        filter_by: Option<EntityFilter>,
    ) -> AppResult<Decimal> {
        let query = LedgerQuery::between(date_from, date_to)
            .with_direction(direction)
            .with_filter(filter_by);
        let totals = self.ledger.totals(&query).await?;
        if totals.net_weight.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok(totals.weighted_price / totals.net_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_running_average_receipts() {
        let mut position = RunningAverage::default();
        position.receive(dec("30"), dec("10"));
        position.receive(dec("70"), dec("10"));
        assert_eq!(position.balance, dec("100"));
        assert_eq!(position.price, dec("10"));

        position.issue(dec("50"));
        assert_eq!(position.balance, dec("50"));
        assert_eq!(position.price, dec("10"));

        position.receive(dec("150"), dec("15"));
        assert_eq!(position.balance, dec("200"));
        assert_eq!(position.price, dec("13.75"));
    }

    #[test]
    fn test_running_average_zero_crossing_keeps_price() {
        let mut position = RunningAverage::default();
        position.issue(dec("10"));
        assert_eq!(position.balance, dec("-10"));
        // receipt brings the position back to exactly zero
        position.receive(dec("10"), dec("99"));
        assert_eq!(position.balance, Decimal::ZERO);
        assert_eq!(position.price, Decimal::ZERO);

        position.receive(dec("4"), dec("5"));
        position.issue(dec("4"));
        position.receive(Decimal::ZERO, dec("7"));
        assert_eq!(position.price, dec("5"));
    }
}
