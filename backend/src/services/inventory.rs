//! Inventory catalogue and transaction listing service

use std::sync::Arc;

use shared::{Direction, EntityFilter, Material, MaterialGroup, TransactionListing};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ledger::{Ledger, TransactionFilter};

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    ledger: Arc<dyn Ledger>,
}

/// Parse the repeated `transaction_types` parameter.
///
/// No values selects every direction. Blank values are skipped, so a list of
/// only blanks selects nothing. Anything other than `IN`/`OUT` is unknown.
pub fn parse_transaction_types(values: &[String]) -> AppResult<Option<Vec<Direction>>> {
    if values.is_empty() {
        return Ok(None);
    }
    let mut directions = Vec::with_capacity(values.len());
    for value in values.iter().filter(|v| !v.is_empty()) {
        let direction: Direction = value
            .parse()
            .map_err(|_| AppError::NotFound(format!("Transaction type {}", value)))?;
        if !directions.contains(&direction) {
            directions.push(direction);
        }
    }
    Ok(Some(directions))
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// All material groups ordered by name
    pub async fn list_material_groups(&self) -> AppResult<Vec<MaterialGroup>> {
        self.ledger.material_groups().await
    }

    /// Materials ordered by name, restricted to one group when given
    pub async fn list_materials(&self, material_group_id: Option<Uuid>) -> AppResult<Vec<Material>> {
        if let Some(id) = material_group_id {
            self.get_material_group(id).await?;
        }
        self.ledger.materials(material_group_id).await
    }

    pub async fn get_material_group(&self, id: Uuid) -> AppResult<MaterialGroup> {
        self.ledger
            .find_material_group(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Material group".to_string()))
    }

    pub async fn get_material(&self, id: Uuid) -> AppResult<Material> {
        self.ledger
            .find_material(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    /// Turn optional request ids into a report filter. A material takes
    /// precedence over a material group.
    pub async fn resolve_filter(
        &self,
        material_group_id: Option<Uuid>,
        material_id: Option<Uuid>,
    ) -> AppResult<Option<EntityFilter>> {
        match (material_id, material_group_id) {
            (Some(id), _) => Ok(Some(EntityFilter::from(&self.get_material(id).await?))),
            (None, Some(id)) => Ok(Some(EntityFilter::from(&self.get_material_group(id).await?))),
            (None, None) => Ok(None),
        }
    }

    /// Transaction listing, newest first. Unknown group or material ids are rejected.
    pub async fn list_transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionListing>> {
        if let Some(id) = filter.material_group_id {
            self.get_material_group(id).await?;
        }
        if let Some(id) = filter.material_id {
            self.get_material(id).await?;
        }
        let listing = self.ledger.transactions(filter).await?;
        tracing::debug!("Listed {} transactions", listing.len());
        Ok(listing)
    }
}
