//! Engagement analytics service
//!
//! Business logic over the event log and the denormalized counters.
//! Write paths (track_event, stat bumps) are best-effort: failures are
//! logged and swallowed so analytics can never break a customer-facing
//! request. Read paths propagate errors; they only feed the dashboard.
//!
//! The counters and the event log are written independently, outside any
//! shared transaction. Under partial failure the two drift apart; that is
//! accepted and not reconciled.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{sea_query::Expr, DbBackend};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::analytics::{EventKind, GalleryStat, ProductStat, TrackOptions};
use crate::errors::FinituraError;
use crate::storage::models::NewEvent;
use crate::storage::SeaOrmStorage;

/// Default trailing window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
/// Hard bounds for the reporting window
pub const MIN_WINDOW_DAYS: i64 = 1;
pub const MAX_WINDOW_DAYS: i64 = 90;

// ============ Report types ============

#[derive(Debug, Clone, Serialize)]
pub struct EventCount {
    pub event: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageViews {
    pub page: String,
    pub views: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyViews {
    pub date: String,
    pub count: u64,
}

/// Dashboard overview for the trailing window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_views: u64,
    /// Distinct ip_hash count; approximate by design
    pub unique_visitors: u64,
    pub event_breakdown: Vec<EventCount>,
    pub top_pages: Vec<PageViews>,
    pub daily_views: Vec<DailyViews>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEngagement {
    pub product: ProductRef,
    pub total_engagements: u64,
}

/// Either a per-event map for one product, or the engagement ranking
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProductReport {
    Single(BTreeMap<String, u64>),
    Top(Vec<ProductEngagement>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetrics {
    pub page_views: u64,
    pub product_views: u64,
    pub total_contacts: u64,
    pub contact_form_submissions: u64,
    pub whatsapp_clicks: u64,
    /// Percentage with two decimals; "0" when there were no page views
    pub view_to_contact_rate: String,
    pub product_view_to_contact_rate: String,
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Clamp a requested window to [1, 90] days, defaulting to 30
    pub fn clamp_days(days: Option<i64>) -> i64 {
        days.unwrap_or(DEFAULT_WINDOW_DAYS)
            .clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS)
    }

    fn window_start(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    fn get_db_backend(&self) -> DbBackend {
        match self.storage.get_backend_name() {
            "sqlite" => DbBackend::Sqlite,
            "mysql" => DbBackend::MySql,
            _ => DbBackend::Postgres,
        }
    }

    /// Day-bucket expression over created_at for the active backend
    fn daily_bucket_expr(&self) -> Expr {
        match self.get_db_backend() {
            DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', created_at)"),
            DbBackend::MySql => Expr::cust("DATE_FORMAT(created_at, '%Y-%m-%d')"),
            _ => Expr::cust("TO_CHAR(created_at, 'YYYY-MM-DD')"),
        }
    }

    // ============ Write paths (best-effort) ============

    /// Append one event row. Never fails the caller: persistence errors
    /// are logged and dropped.
    pub async fn track_event(&self, event: EventKind, page: &str, options: TrackOptions) {
        let row = NewEvent {
            event: event.as_str().to_string(),
            page: page.to_string(),
            product_id: options.product_id,
            metadata: options.metadata.map(|m| m.to_string()),
            user_agent: options.user_agent,
            ip_hash: options.ip_hash,
        };

        if let Err(e) = self.storage.insert_event(row).await {
            error!("Analytics tracking error: {}", e);
        }
    }

    /// Bump a product counter. Unknown ids are a no-op; errors are logged
    /// and dropped.
    pub async fn increment_product_stat(&self, product_id: &str, stat: ProductStat) {
        match self.storage.increment_product_stat(product_id, stat).await {
            Ok(0) => debug!(
                "Stat bump on missing product {} ({}) ignored",
                product_id,
                stat.as_ref()
            ),
            Ok(_) => {}
            Err(e) => error!(
                "Failed to increment {} for product {}: {}",
                stat.as_ref(),
                product_id,
                e
            ),
        }
    }

    /// Bump a gallery counter, same contract as the product variant
    pub async fn increment_gallery_stat(&self, image_id: &str, stat: GalleryStat) {
        match self.storage.increment_gallery_stat(image_id, stat).await {
            Ok(0) => debug!(
                "Stat bump on missing gallery image {} ({}) ignored",
                image_id,
                stat.as_ref()
            ),
            Ok(_) => {}
            Err(e) => error!(
                "Failed to increment {} for gallery {}: {}",
                stat.as_ref(),
                image_id,
                e
            ),
        }
    }

    // ============ Read paths (loud) ============

    /// Dashboard overview: totals, visitor estimate, breakdown, top pages
    /// and the daily series, all scoped to the trailing window.
    pub async fn summary(&self, days: i64) -> Result<AnalyticsSummary, FinituraError> {
        let days = days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS);
        let start = Self::window_start(days);
        info!("Analytics: summary over the last {} days", days);

        let date_expr = self.daily_bucket_expr();

        let (total_views, unique_visitors, breakdown_rows, page_rows, daily_rows) = tokio::try_join!(
            self.storage.count_events(EventKind::PageView, start),
            self.storage.count_distinct_visitors(EventKind::PageView, start),
            self.storage.event_breakdown(start),
            self.storage.top_pages(EventKind::PageView, start, 10),
            self.storage
                .daily_event_counts(EventKind::PageView, start, date_expr),
        )
        .map_err(|e| FinituraError::analytics_query(format!("Summary query failed: {}", e)))?;

        let summary = AnalyticsSummary {
            total_views,
            unique_visitors,
            event_breakdown: breakdown_rows
                .into_iter()
                .map(|row| EventCount {
                    event: row.event,
                    count: row.count.max(0) as u64,
                })
                .collect(),
            top_pages: page_rows
                .into_iter()
                .map(|row| PageViews {
                    page: row.page,
                    views: row.count.max(0) as u64,
                })
                .collect(),
            daily_views: daily_rows
                .into_iter()
                .map(|row| DailyViews {
                    date: row.label,
                    count: row.count.max(0) as u64,
                })
                .collect(),
        };

        debug!(
            "Analytics: summary returned {} breakdown rows, {} pages, {} days",
            summary.event_breakdown.len(),
            summary.top_pages.len(),
            summary.daily_views.len()
        );

        Ok(summary)
    }

    /// Per-product event map, or the top-10 engagement ranking when no id
    /// is given. Ids whose product row is gone are dropped from the
    /// ranking by the second-pass lookup.
    pub async fn product_report(
        &self,
        product_id: Option<&str>,
        days: i64,
    ) -> Result<ProductReport, FinituraError> {
        let days = days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS);
        let start = Self::window_start(days);

        if let Some(id) = product_id {
            info!("Analytics: product report for {}", id);
            let rows = self
                .storage
                .event_breakdown_for_product(id, start)
                .await
                .map_err(|e| {
                    FinituraError::analytics_query(format!("Product report query failed: {}", e))
                })?;

            let map: BTreeMap<String, u64> = rows
                .into_iter()
                .map(|row| (row.event, row.count.max(0) as u64))
                .collect();
            return Ok(ProductReport::Single(map));
        }

        info!("Analytics: top products over the last {} days", days);
        let ranking = self
            .storage
            .top_product_refs(start, 10)
            .await
            .map_err(|e| {
                FinituraError::analytics_query(format!("Top products query failed: {}", e))
            })?;

        let ids: Vec<String> = ranking
            .iter()
            .filter_map(|row| row.product_id.clone())
            .collect();
        let briefs = self.storage.get_product_briefs(&ids).await?;
        let by_id: BTreeMap<&str, &crate::storage::models::ProductBrief> =
            briefs.iter().map(|b| (b.id.as_str(), b)).collect();

        let top: Vec<ProductEngagement> = ranking
            .into_iter()
            .filter_map(|row| {
                let id = row.product_id?;
                let brief = by_id.get(id.as_str())?;
                Some(ProductEngagement {
                    product: ProductRef {
                        id: brief.id.clone(),
                        name: brief.name.clone(),
                        image_url: brief.image_url.clone(),
                    },
                    total_engagements: row.count.max(0) as u64,
                })
            })
            .collect();

        Ok(ProductReport::Top(top))
    }

    /// Views → contact funnel over the trailing window
    pub async fn conversion_metrics(&self, days: i64) -> Result<ConversionMetrics, FinituraError> {
        let days = days.clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS);
        let start = Self::window_start(days);
        info!("Analytics: conversion metrics over the last {} days", days);

        let (page_views, product_views, contact_forms, whatsapp_clicks) = tokio::try_join!(
            self.storage.count_events(EventKind::PageView, start),
            self.storage.count_events(EventKind::ProductView, start),
            self.storage.count_events(EventKind::ContactForm, start),
            self.storage.count_events(EventKind::WhatsappClick, start),
        )
        .map_err(|e| {
            FinituraError::analytics_query(format!("Conversion metrics query failed: {}", e))
        })?;

        let total_contacts = contact_forms + whatsapp_clicks;

        Ok(ConversionMetrics {
            page_views,
            product_views,
            total_contacts,
            contact_form_submissions: contact_forms,
            whatsapp_clicks,
            view_to_contact_rate: conversion_rate(total_contacts, page_views),
            product_view_to_contact_rate: conversion_rate(total_contacts, product_views),
        })
    }
}

/// Percentage with two decimals; "0" when the denominator is zero
fn conversion_rate(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        return "0".to_string();
    }
    format!("{:.2}", (numerator as f64 / denominator as f64) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rate_zero_denominator() {
        assert_eq!(conversion_rate(10, 0), "0");
    }

    #[test]
    fn test_conversion_rate_two_decimals() {
        // 200 page views, 3 forms + 7 clicks
        assert_eq!(conversion_rate(10, 200), "5.00");
        assert_eq!(conversion_rate(1, 3), "33.33");
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(AnalyticsService::clamp_days(None), 30);
        assert_eq!(AnalyticsService::clamp_days(Some(0)), 1);
        assert_eq!(AnalyticsService::clamp_days(Some(-5)), 1);
        assert_eq!(AnalyticsService::clamp_days(Some(45)), 45);
        assert_eq!(AnalyticsService::clamp_days(Some(400)), 90);
    }
}
