//! Route definitions for the Inventory Management Platform

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/reports", report_routes())
}

/// Report and listing routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary_report))
        .route("/quantities", get(handlers::get_quantity_report))
        .route("/stock-levels", get(handlers::get_stock_level_report))
        .route("/weekly-financials", get(handlers::get_weekly_financials))
        .route("/summary-financials", get(handlers::get_summary_financials))
        .route("/transactions", get(handlers::list_transactions))
        .route("/material-groups", get(handlers::list_material_groups))
        .route("/materials/:material_group_id", get(handlers::list_materials))
}
