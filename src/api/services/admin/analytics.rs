//! Admin reporting endpoint
//!
//! `GET /api/analytics` behind the admin session. Dispatches on the
//! `type` selector and wraps the chosen report with request metadata.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::helpers::{error_response, is_admin, unauthorized_response};
use crate::services::AnalyticsService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub days: Option<i64>,
    pub product_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportMeta {
    #[serde(rename = "type")]
    report_type: String,
    days: i64,
    generated_at: String,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    success: bool,
    data: serde_json::Value,
    meta: ReportMeta,
}

/// GET /api/analytics
pub async fn get_report(
    req: HttpRequest,
    query: web::Query<ReportQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    let days = AnalyticsService::clamp_days(query.days);
    let report_type = query.report_type.as_deref().unwrap_or("summary");

    let data = match report_type {
        "products" => analytics
            .product_report(query.product_id.as_deref(), days)
            .await
            .and_then(|report| serde_json::to_value(report).map_err(Into::into)),
        "conversions" => analytics
            .conversion_metrics(days)
            .await
            .and_then(|report| serde_json::to_value(report).map_err(Into::into)),
        _ => analytics
            .summary(days)
            .await
            .and_then(|report| serde_json::to_value(report).map_err(Into::into)),
    };

    let data = match data {
        Ok(value) => value,
        Err(e) => {
            error!("Analytics report failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch analytics",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(ReportResponse {
        success: true,
        data,
        meta: ReportMeta {
            report_type: report_type.to_string(),
            days,
            generated_at: Utc::now().to_rfc3339(),
        },
    }))
}
