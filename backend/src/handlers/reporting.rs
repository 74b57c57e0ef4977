//! Reporting handlers for summaries, stock levels and financial charts

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::Resolution;

use crate::error::AppResult;
use crate::handlers::params::{
    current_month, parse_flag, parse_optional_uuid, parse_resolution, report_window, trailing_buckets,
};
use crate::services::reporting::{FinancialBreakdown, ReportingService, StockLevelReport, WeeklyFinancials};
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub resolution: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub material_group: Option<String>,
    pub material: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Default, Deserialize)]
pub struct StockLevelQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub by_material_group: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BreakdownQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub by_material_group: Option<String>,
    pub normalize: Option<String>,
}

fn rows_response<T: Serialize>(rows: Vec<T>, format: Option<&str>, filename: &str) -> AppResult<Response> {
    if format == Some("csv") {
        let csv = ReportingService::export_to_csv(&rows)?;
        let disposition = format!("attachment; filename=\"{}.csv\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}

/// Get the period summary report
pub async fn get_summary_report(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Response> {
    let resolution = parse_resolution(query.resolution.as_deref())?;
    let (date_from, date_to) = report_window(
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        current_month(Utc::now())?,
        resolution,
        state.config.reporting.max_periods,
    )?;
    let filter_by = InventoryService::new(state.ledger.clone())
        .resolve_filter(
            parse_optional_uuid("material_group", query.material_group.as_deref())?,
            parse_optional_uuid("material", query.material.as_deref())?,
        )
        .await?;

    let service = ReportingService::new(state.ledger.clone());
    let rows = service
        .summary_report(date_from, date_to, resolution, filter_by)
        .await?;

    rows_response(rows, query.format.as_deref(), "summary")
}

/// Get the quantity-only period report
pub async fn get_quantity_report(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Response> {
    let resolution = parse_resolution(query.resolution.as_deref())?;
    let (date_from, date_to) = report_window(
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        current_month(Utc::now())?,
        resolution,
        state.config.reporting.max_periods,
    )?;
    let filter_by = InventoryService::new(state.ledger.clone())
        .resolve_filter(
            parse_optional_uuid("material_group", query.material_group.as_deref())?,
            parse_optional_uuid("material", query.material.as_deref())?,
        )
        .await?;

    let service = ReportingService::new(state.ledger.clone());
    let rows = service
        .generate_report(date_from, date_to, resolution, filter_by)
        .await?;

    rows_response(rows, query.format.as_deref(), "quantities")
}

/// Get daily stock levels per material or material group
pub async fn get_stock_level_report(
    State(state): State<AppState>,
    Query(query): Query<StockLevelQuery>,
) -> AppResult<Json<StockLevelReport>> {
    let (date_from, date_to) = report_window(
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        trailing_buckets(Utc::now(), Resolution::Day, 30)?,
        Resolution::Day,
        state.config.reporting.max_periods,
    )?;
    let by_material_group = parse_flag("by_material_group", query.by_material_group.as_deref())?;

    let service = ReportingService::new(state.ledger.clone());
    let report = service
        .stock_level_report(date_from, date_to, by_material_group)
        .await?;
    Ok(Json(report))
}

/// Get weekly sales and purchases
pub async fn get_weekly_financials(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<WeeklyFinancials>> {
    let (date_from, date_to) = report_window(
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        trailing_buckets(Utc::now(), Resolution::Week, 12)?,
        Resolution::Week,
        state.config.reporting.max_periods,
    )?;

    let service = ReportingService::new(state.ledger.clone());
    let report = service
        .weekly_sales_and_purchases_report(date_from, date_to)
        .await?;
    Ok(Json(report))
}

/// Get sales and purchases per material or material group
pub async fn get_summary_financials(
    State(state): State<AppState>,
    Query(query): Query<BreakdownQuery>,
) -> AppResult<Json<FinancialBreakdown>> {
    // one aggregate over the whole window, so no bucket limit applies
    let (date_from, date_to) = report_window(
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        current_month(Utc::now())?,
        Resolution::Month,
        usize::MAX,
    )?;
    let by_material_group = parse_flag("by_material_group", query.by_material_group.as_deref())?;
    let normalize = parse_flag("normalize", query.normalize.as_deref())?;

    let service = ReportingService::new(state.ledger.clone());
    let report = service
        .sales_and_purchases_report(date_from, date_to, by_material_group, normalize)
        .await?;
    Ok(Json(report))
}
