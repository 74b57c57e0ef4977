//! In-memory ledger used for fixtures and tests

use async_trait::async_trait;
use shared::{
    validate_unit_price, validate_weighing, Material, MaterialGroup, Transaction,
    TransactionListing,
};
use uuid::Uuid;

use super::{Ledger, LedgerQuery, LedgerTotals, Movement, TransactionFilter};
use crate::error::{AppError, AppResult};

/// Ledger held entirely in memory. Populate it before sharing it.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    groups: Vec<MaterialGroup>,
    materials: Vec<Material>,
    transactions: Vec<Transaction>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: &str) -> MaterialGroup {
        let group = MaterialGroup::new(name);
        self.groups.push(group.clone());
        group
    }

    pub fn add_material(&mut self, name: &str, group: &MaterialGroup) -> Material {
        let material = Material::new(name, group);
        self.materials.push(material.clone());
        material
    }

    /// Append a transaction. The material must be known to the ledger.
    pub fn record(&mut self, transaction: Transaction) -> AppResult<()> {
        validate_weighing(transaction.gross_weight, transaction.tare_weight)
            .map_err(|e| AppError::field("gross_weight", e))?;
        validate_unit_price(transaction.unit_price)
            .map_err(|e| AppError::field("unit_price", e))?;
        if self.group_of(transaction.material_id).is_none() {
            return Err(AppError::NotFound("Material".to_string()));
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn group_of(&self, material_id: Uuid) -> Option<Uuid> {
        self.materials
            .iter()
            .find(|m| m.id == material_id)
            .map(|m| m.material_group_id)
    }

    fn selected<'a>(&'a self, query: &'a LedgerQuery) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| {
            self.group_of(t.material_id)
                .map_or(false, |group| query.matches(t.direction, t.material_id, group, t.timestamp))
        })
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn totals(&self, query: &LedgerQuery) -> AppResult<LedgerTotals> {
        Ok(self.selected(query).fold(LedgerTotals::default(), |acc, t| {
            acc.add(t.gross_weight, t.tare_weight, t.unit_price)
        }))
    }

    async fn movements(&self, query: &LedgerQuery) -> AppResult<Vec<Movement>> {
        let mut movements: Vec<Movement> = self
            .selected(query)
            .map(|t| Movement {
                direction: t.direction,
                timestamp: t.timestamp,
                net_weight: t.net_weight(),
                unit_price: t.unit_price,
            })
            .collect();
        // stable: same-instant movements keep recording order
        movements.sort_by_key(|m| m.timestamp);
        Ok(movements)
    }

    async fn material_groups(&self) -> AppResult<Vec<MaterialGroup>> {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn materials(&self, material_group_id: Option<Uuid>) -> AppResult<Vec<Material>> {
        let mut materials: Vec<Material> = self
            .materials
            .iter()
            .filter(|m| material_group_id.map_or(true, |id| m.material_group_id == id))
            .cloned()
            .collect();
        materials.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(materials)
    }

    async fn find_material_group(&self, id: Uuid) -> AppResult<Option<MaterialGroup>> {
        Ok(self.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_material(&self, id: Uuid) -> AppResult<Option<Material>> {
        Ok(self.materials.iter().find(|m| m.id == id).cloned())
    }

    async fn transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionListing>> {
        let mut selected: Vec<(&Transaction, &Material, &MaterialGroup)> = self
            .transactions
            .iter()
            .filter_map(|t| {
                let material = self.materials.iter().find(|m| m.id == t.material_id)?;
                let group = self.groups.iter().find(|g| g.id == material.material_group_id)?;
                filter
                    .matches(t.direction, material.id, group.id, t.timestamp)
                    .then_some((t, material, group))
            })
            .collect();
        selected.sort_by(|a, b| b.0.timestamp.cmp(&a.0.timestamp));

        Ok(selected
            .into_iter()
            .map(|(t, material, group)| TransactionListing::new(t, &group.name, &material.name))
            .collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}
