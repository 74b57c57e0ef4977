//! Ledger fixtures shared by the integration suites

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use inventory_backend::{Ledger, MemoryLedger};
use rust_decimal::Decimal;
use shared::{tick, Direction, Material, MaterialGroup, Transaction};

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Midnight UTC of the given day
pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Last tick of the given day
pub fn end_of_day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    day(y, m, d) + chrono::Duration::days(1) - tick()
}

pub fn weighing(
    ledger: &mut MemoryLedger,
    direction: Direction,
    material: &Material,
    at: DateTime<Utc>,
    gross: &str,
    tare: &str,
    price: &str,
) {
    ledger
        .record(Transaction::new(
            direction,
            material.id,
            at,
            dec(gross),
            dec(tare),
            dec(price),
        ))
        .unwrap();
}

/// Two groups, three materials and one weighing per material:
///
/// - IN  alu cooler 2021-02-03, 10 - 2 @ 5
/// - IN  alu can    2021-03-04, 20 - 4 @ 10
/// - OUT steel can  2021-04-05, 30 - 5 @ 15
pub struct Scrapyard {
    pub ledger: MemoryLedger,
    pub aluminium: MaterialGroup,
    pub steel: MaterialGroup,
    pub alu_cooler: Material,
    pub alu_can: Material,
    pub steel_can: Material,
}

impl Scrapyard {
    pub fn new() -> Self {
        let mut ledger = MemoryLedger::new();
        let aluminium = ledger.add_group("aluminium");
        let steel = ledger.add_group("steel");
        let alu_cooler = ledger.add_material("alu cooler", &aluminium);
        let alu_can = ledger.add_material("alu can", &aluminium);
        let steel_can = ledger.add_material("steel can", &steel);

        weighing(&mut ledger, Direction::In, &alu_cooler, day(2021, 2, 3), "10", "2", "5");
        weighing(&mut ledger, Direction::In, &alu_can, day(2021, 3, 4), "20", "4", "10");
        weighing(&mut ledger, Direction::Out, &steel_can, day(2021, 4, 5), "30", "5", "15");

        Self {
            ledger,
            aluminium,
            steel,
            alu_cooler,
            alu_can,
            steel_can,
        }
    }

    pub fn shared(&self) -> Arc<dyn Ledger> {
        Arc::new(self.ledger.clone())
    }
}

/// Single material with four movements on 2021-06-01..04:
/// IN 32/2 @ 10, IN 72/2 @ 10, OUT 54/4 @ 30, IN 152/2 @ 15
pub fn averaging_ledger() -> (Arc<dyn Ledger>, Material) {
    let mut ledger = MemoryLedger::new();
    let group = ledger.add_group("copper");
    let wire = ledger.add_material("copper wire", &group);

    weighing(&mut ledger, Direction::In, &wire, day(2021, 6, 1), "32", "2", "10");
    weighing(&mut ledger, Direction::In, &wire, day(2021, 6, 2), "72", "2", "10");
    weighing(&mut ledger, Direction::Out, &wire, day(2021, 6, 3), "54", "4", "30");
    weighing(&mut ledger, Direction::In, &wire, day(2021, 6, 4), "152", "2", "15");

    (Arc::new(ledger), wire)
}
