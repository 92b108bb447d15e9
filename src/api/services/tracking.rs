//! Public tracking endpoint
//!
//! `POST /api/analytics` accepts one event per request. The body is
//! parsed by hand so a malformed payload (unknown event tag, missing
//! fields) gets the envelope's 400 instead of the framework default.
//! A valid request is always answered with success, even when the
//! underlying write failed: tracking must be invisible to the visitor.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;

use crate::analytics::{client_info, EventKind, TrackOptions};
use crate::api::services::admin::helpers::{error_response, message_response};
use crate::services::AnalyticsService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackEventRequest {
    event: EventKind,
    page: String,
    product_id: Option<String>,
    metadata: Option<serde_json::Value>,
}

/// POST /api/analytics
pub async fn track_event(
    req: HttpRequest,
    body: web::Bytes,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    let payload: TrackEventRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                "Invalid event data",
            ));
        }
    };

    let info = client_info(req.headers(), crate::config::get_config().ip_salt());

    analytics
        .track_event(
            payload.event,
            &payload.page,
            TrackOptions {
                product_id: payload.product_id,
                metadata: payload.metadata,
                user_agent: Some(info.user_agent),
                ip_hash: Some(info.ip_hash),
            },
        )
        .await;

    Ok(message_response("Event tracked"))
}
