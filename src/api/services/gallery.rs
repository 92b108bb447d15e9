//! Gallery endpoints
//!
//! Same shape as the product API with a narrower surface: the public
//! engagement PATCH only accepts "like".

use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::warn;

use super::admin::helpers::{
    created_response, error_from_finitura, error_response, is_admin, message_response,
    paginated_response, success_response, success_with_message, unauthorized_response,
};
use crate::analytics::GalleryStat;
use crate::services::{AnalyticsService, MediaStore};
use crate::storage::{GalleryFilter, GalleryPatch, GallerySort, NewGalleryImage, SeaOrmStorage};

use migration::entities::gallery_image;

/// Closed category set for gallery images
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum GalleryCategory {
    Interior,
    Exterior,
    Office,
    Commercial,
    Residential,
    Dining,
    Bedroom,
    LivingRoom,
    Bathroom,
    Other,
}

const MAX_PAGE_SIZE: u64 = 50;
const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct GalleryListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<GallerySort>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryRequest {
    pub title: String,
    pub category: String,
    pub image_url: String,
}

impl CreateGalleryRequest {
    fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_category(&self.category)?;
        validate_image_url(&self.image_url)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateGalleryRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref category) = self.category {
            validate_category(category)?;
        }
        if let Some(ref image_url) = self.image_url {
            validate_image_url(image_url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatActionRequest {
    pub action: String,
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.chars().count() < 2 || title.chars().count() > 100 {
        return Err("Title must be between 2 and 100 characters".to_string());
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), String> {
    GalleryCategory::from_str(category)
        .map(|_| ())
        .map_err(|_| format!("Unknown gallery category: {}", category))
}

fn validate_image_url(image_url: &str) -> Result<(), String> {
    url::Url::parse(image_url)
        .map(|_| ())
        .map_err(|_| "Image URL must be a valid URL".to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub views: i64,
    pub likes: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<gallery_image::Model> for GalleryResponse {
    fn from(model: gallery_image::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            category: model.category,
            image_url: model.image_url,
            views: model.views,
            likes: model.likes,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/gallery
pub async fn list_gallery(
    query: web::Query<GalleryListQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = GalleryFilter {
        category: query.category.clone(),
        search: query.search.clone(),
    };
    let sort = query.sort.unwrap_or_default();

    match storage.list_gallery_images(page, limit, &filter, sort).await {
        Ok((models, total)) => {
            let data: Vec<GalleryResponse> =
                models.into_iter().map(GalleryResponse::from).collect();
            Ok(paginated_response(data, page, limit, total))
        }
        Err(e) => {
            warn!("Gallery listing failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch gallery images",
            ))
        }
    }
}

/// GET /api/gallery/{id}
pub async fn get_gallery_image(
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();

    let image = match storage.get_gallery_image(&id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                "Gallery image not found",
            ));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    };

    let svc = analytics.get_ref().clone();
    let view_id = id.clone();
    tokio::spawn(async move {
        svc.increment_gallery_stat(&view_id, GalleryStat::Views).await;
    });

    Ok(success_response(GalleryResponse::from(image)))
}

/// POST /api/gallery (admin)
pub async fn create_gallery_image(
    req: HttpRequest,
    body: web::Json<CreateGalleryRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let input = NewGalleryImage {
        title: body.title.clone(),
        category: body.category.clone(),
        image_url: body.image_url.clone(),
    };

    match storage.insert_gallery_image(input).await {
        Ok(model) => Ok(created_response(
            GalleryResponse::from(model),
            "Gallery image added successfully",
        )),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// PUT /api/gallery/{id} (admin)
pub async fn update_gallery_image(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateGalleryRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let patch = GalleryPatch {
        title: body.title.clone(),
        category: body.category.clone(),
        image_url: body.image_url.clone(),
    };

    match storage.update_gallery_image(&path.into_inner(), patch).await {
        Ok(Some(model)) => Ok(success_with_message(
            GalleryResponse::from(model),
            "Gallery image updated successfully",
        )),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            "Gallery image not found",
        )),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// DELETE /api/gallery/{id} (admin)
pub async fn delete_gallery_image(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    media: web::Data<Arc<MediaStore>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    let id = path.into_inner();

    let image = match storage.get_gallery_image(&id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                "Gallery image not found",
            ));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    };

    if !image.image_url.is_empty() {
        if let Err(e) = media.delete_by_url(&image.image_url).await {
            warn!("Failed to delete gallery image {}: {}", image.image_url, e);
        }
    }

    match storage.delete_gallery_image(&id).await {
        Ok(true) => Ok(message_response("Gallery image deleted successfully")),
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            "Gallery image not found",
        )),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// PATCH /api/gallery/{id} — public like bump
pub async fn bump_gallery_stat(
    path: web::Path<String>,
    body: web::Json<StatActionRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    if body.action != "like" {
        return Ok(error_response(StatusCode::BAD_REQUEST, "Invalid action"));
    }

    let id = path.into_inner();

    match storage.get_gallery_image(&id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                "Gallery image not found",
            ));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    }

    analytics
        .increment_gallery_stat(&id, GalleryStat::Likes)
        .await;

    Ok(message_response("Like recorded"))
}

/// `/gallery` routes
pub fn routes() -> actix_web::Scope {
    web::scope("/gallery")
        .route("", web::get().to(list_gallery))
        .route("", web::post().to(create_gallery_image))
        .route("/{id}", web::get().to(get_gallery_image))
        .route("/{id}", web::put().to(update_gallery_image))
        .route("/{id}", web::delete().to(delete_gallery_image))
        .route("/{id}", web::patch().to(bump_gallery_stat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_category_parse() {
        assert_eq!(
            GalleryCategory::from_str("living-room").unwrap(),
            GalleryCategory::LivingRoom
        );
        assert!(GalleryCategory::from_str("garage").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateGalleryRequest {
            title: "Venetian hallway".to_string(),
            category: "interior".to_string(),
            image_url: "https://cdn.example.org/gallery/h1.webp".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad = CreateGalleryRequest {
            title: "V".to_string(),
            category: "interior".to_string(),
            image_url: "https://cdn.example.org/gallery/h1.webp".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
