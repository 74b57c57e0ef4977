//! HTTP handlers for the material catalogue and the transaction listing

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use serde::Deserialize;
use shared::{Material, MaterialGroup, TransactionListing};

use crate::error::{AppError, AppResult};
use crate::handlers::params::{parse_optional_datetime, parse_optional_uuid, Bound};
use crate::ledger::TransactionFilter;
use crate::services::inventory::{parse_transaction_types, InventoryService};
use crate::AppState;

/// Query for the transaction listing. `transaction_types` may repeat.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(default)]
    pub transaction_types: Vec<String>,
    pub material_group: Option<String>,
    pub material: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// List all material groups
pub async fn list_material_groups(State(state): State<AppState>) -> AppResult<Json<Vec<MaterialGroup>>> {
    let service = InventoryService::new(state.ledger);
    let groups = service.list_material_groups().await?;
    Ok(Json(groups))
}

/// List materials of one group, or of every group when the id is `all`
pub async fn list_materials(
    State(state): State<AppState>,
    Path(material_group_id): Path<String>,
) -> AppResult<Json<Vec<Material>>> {
    let group_id = if material_group_id == "all" {
        None
    } else {
        let id = material_group_id
            .parse()
            .map_err(|_| AppError::NotFound("Material group".to_string()))?;
        Some(id)
    };

    let service = InventoryService::new(state.ledger);
    let materials = service.list_materials(group_id).await?;
    Ok(Json(materials))
}

/// List transactions, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<TransactionListing>>> {
    let filter = TransactionFilter {
        directions: parse_transaction_types(&query.transaction_types)?,
        material_group_id: parse_optional_uuid("material_group", query.material_group.as_deref())?,
        material_id: parse_optional_uuid("material", query.material.as_deref())?,
        date_from: parse_optional_datetime("date_from", query.date_from.as_deref(), Bound::Start)?,
        date_to: parse_optional_datetime("date_to", query.date_to.as_deref(), Bound::End)?,
    };

    let service = InventoryService::new(state.ledger);
    let transactions = service.list_transactions(&filter).await?;
    Ok(Json(transactions))
}
