//! Review endpoints
//!
//! Visitors submit reviews that stay hidden until moderated. The public
//! listing exposes approved reviews plus aggregate rating stats; an
//! admin session with `all=true` sees the moderation queue as well.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::admin::helpers::{
    error_from_finitura, error_response, is_admin, message_response, success_response,
    success_with_message, unauthorized_response, ApiResponse, PaginationInfo,
};
use crate::analytics::{EventKind, TrackOptions};
use crate::services::{AnalyticsService, EmailNotifier};
use crate::storage::{NewReview, SeaOrmStorage};
use crate::utils::is_valid_email;

use migration::entities::review;

const MAX_PAGE_SIZE: u64 = 50;
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Admin only: include unapproved reviews
    pub all: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub name: String,
    pub email: Option<String>,
    pub rating: i32,
    pub message: String,
}

impl CreateReviewRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.chars().count() < 2 || self.name.chars().count() > 50 {
            return Err("Name must be between 2 and 50 characters".to_string());
        }
        if let Some(ref email) = self.email {
            if !email.is_empty() && !is_valid_email(email) {
                return Err("Invalid email".to_string());
            }
        }
        if !(1..=5).contains(&self.rating) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        if self.message.chars().count() < 10 || self.message.chars().count() > 500 {
            return Err("Message must be between 10 and 500 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ModerateReviewRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub name: String,
    pub rating: i32,
    pub message: String,
    /// Moderation state, shown to admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    pub created_at: String,
}

impl ReviewResponse {
    fn from_model(model: review::Model, include_moderation: bool) -> Self {
        Self {
            id: model.id,
            name: model.name,
            rating: model.rating,
            message: model.message,
            approved: include_moderation.then_some(model.approved),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewStatsResponse {
    average_rating: f64,
    total_reviews: u64,
}

#[derive(Debug, Serialize)]
struct ReviewListResponse {
    success: bool,
    data: Vec<ReviewResponse>,
    stats: ReviewStatsResponse,
    pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
struct CreatedReview {
    id: String,
    name: String,
    rating: i32,
}

/// GET /api/reviews
pub async fn list_reviews(
    req: HttpRequest,
    query: web::Query<ReviewListQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let admin = is_admin(&req);
    let approved_only = !(admin && query.all.unwrap_or(false));

    let listing = storage.list_reviews(page, limit, approved_only).await;
    let stats = storage.review_stats().await;

    match (listing, stats) {
        (Ok((models, total)), Ok(stats)) => {
            let data: Vec<ReviewResponse> = models
                .into_iter()
                .map(|model| ReviewResponse::from_model(model, admin))
                .collect();

            Ok(HttpResponse::Ok().json(ReviewListResponse {
                success: true,
                data,
                stats: ReviewStatsResponse {
                    average_rating: stats.average_rating,
                    total_reviews: stats.total_reviews,
                },
                pagination: PaginationInfo::new(page, limit, total),
            }))
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("Review listing failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch reviews",
            ))
        }
    }
}

/// POST /api/reviews — public submission, held for moderation
pub async fn submit_review(
    body: web::Json<CreateReviewRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
    mailer: web::Data<Arc<EmailNotifier>>,
) -> ActixResult<HttpResponse> {
    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let input = NewReview {
        name: body.name.clone(),
        email: body.email.clone().filter(|s| !s.is_empty()),
        rating: body.rating,
        message: body.message.clone(),
    };

    let created = match storage.insert_review(input).await {
        Ok(model) => model,
        Err(e) => return Ok(error_from_finitura(&e)),
    };

    analytics
        .track_event(
            EventKind::ReviewSubmit,
            "/testimonials",
            TrackOptions {
                metadata: Some(serde_json::json!({ "rating": body.rating })),
                ..Default::default()
            },
        )
        .await;

    // Moderation heads-up, fire-and-forget
    let notifier = mailer.get_ref().clone();
    let (name, rating, message, review_id) = (
        created.name.clone(),
        created.rating,
        created.message.clone(),
        created.id.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = notifier
            .send_review_notification(&name, rating, &message, &review_id)
            .await
        {
            error!("Failed to send review notification: {}", e);
        }
    });

    Ok(HttpResponse::Created().json(ApiResponse {
        success: true,
        data: Some(CreatedReview {
            id: created.id,
            name: created.name,
            rating: created.rating,
        }),
        message: Some(
            "Thank you for your review! It will be published after moderation.".to_string(),
        ),
        error: None,
    }))
}

/// GET /api/reviews/{id} — unapproved rows are invisible to the public
pub async fn get_review(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let admin = is_admin(&req);

    match storage.get_review(&path.into_inner()).await {
        Ok(Some(model)) if model.approved || admin => {
            Ok(success_response(ReviewResponse::from_model(model, admin)))
        }
        Ok(_) => Ok(error_response(StatusCode::NOT_FOUND, "Review not found")),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// PATCH /api/reviews/{id} (admin) — approve or reject
pub async fn moderate_review(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ModerateReviewRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    match storage
        .set_review_approved(&path.into_inner(), body.approved)
        .await
    {
        Ok(Some(model)) => Ok(success_with_message(
            ReviewResponse::from_model(model, true),
            if body.approved {
                "Review approved"
            } else {
                "Review rejected"
            },
        )),
        Ok(None) => Ok(error_response(StatusCode::NOT_FOUND, "Review not found")),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// DELETE /api/reviews/{id} (admin)
pub async fn delete_review(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    match storage.delete_review(&path.into_inner()).await {
        Ok(true) => Ok(message_response("Review deleted successfully")),
        Ok(false) => Ok(error_response(StatusCode::NOT_FOUND, "Review not found")),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// `/reviews` routes
pub fn routes() -> actix_web::Scope {
    web::scope("/reviews")
        .route("", web::get().to(list_reviews))
        .route("", web::post().to(submit_review))
        .route("/{id}", web::get().to(get_review))
        .route("/{id}", web::patch().to(moderate_review))
        .route("/{id}", web::delete().to(delete_review))
}
