//! Product catalogue endpoints
//!
//! Public: listing with filters, single fetch (bumps the view counter),
//! and the engagement PATCH. Create/update/delete require an admin
//! session.

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
use crate::analytics::ProductStat;
use crate::services::{AnalyticsService, MediaStore};
use crate::storage::{NewProduct, ProductFilter, ProductPatch, ProductSort, SeaOrmStorage};

use migration::entities::product;

/// Closed category set for products
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ProductCategory {
    Venetian,
    Marmorino,
    Travertino,
    Metallic,
    LiquidMetal,
    Decorative,
    Specialty,
    Tools,
    Other,
}

const MAX_PAGE_SIZE: u64 = 50;
const DEFAULT_PAGE_SIZE: u64 = 12;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub in_stock: Option<bool>,
}

impl CreateProductRequest {
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_price(self.price)?;
        validate_category(&self.category)?;
        validate_image_url(&self.image_url)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

impl UpdateProductRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
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

fn validate_name(name: &str) -> Result<(), String> {
    if name.chars().count() < 2 || name.chars().count() > 100 {
        return Err("Name must be between 2 and 100 characters".to_string());
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() < 10 || description.chars().count() > 1000 {
        return Err("Description must be between 10 and 1000 characters".to_string());
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("Price must be positive".to_string());
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), String> {
    ProductCategory::from_str(category)
        .map(|_| ())
        .map_err(|_| format!("Unknown product category: {}", category))
}

fn validate_image_url(image_url: &str) -> Result<(), String> {
    url::Url::parse(image_url)
        .map(|_| ())
        .map_err(|_| "Image URL must be a valid URL".to_string())
}

/// Wire shape of a product row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub in_stock: bool,
    pub views: i64,
    pub likes: i64,
    pub shares: i64,
    pub contacts: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            in_stock: model.in_stock,
            views: model.views,
            likes: model.likes,
            shares: model.shares,
            contacts: model.contacts,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/products
pub async fn list_products(
    query: web::Query<ProductListQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = ProductFilter {
        category: query.category.clone(),
        in_stock: query.in_stock,
        min_price: query.min_price,
        max_price: query.max_price,
        search: query.search.clone(),
    };
    let sort = query.sort.unwrap_or_default();

    match storage.list_products(page, limit, &filter, sort).await {
        Ok((models, total)) => {
            let data: Vec<ProductResponse> =
                models.into_iter().map(ProductResponse::from).collect();
            Ok(paginated_response(data, page, limit, total))
        }
        Err(e) => {
            warn!("Product listing failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch products",
            ))
        }
    }
}

/// GET /api/products/{id}
pub async fn get_product(
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();

    let product = match storage.get_product(&id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Ok(error_response(StatusCode::NOT_FOUND, "Product not found"));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    };

    // View bump is fire-and-forget; the response does not wait for it
    let svc = analytics.get_ref().clone();
    let view_id = id.clone();
    tokio::spawn(async move {
        svc.increment_product_stat(&view_id, ProductStat::Views).await;
    });

    Ok(success_response(ProductResponse::from(product)))
}

/// POST /api/products (admin)
pub async fn create_product(
    req: HttpRequest,
    body: web::Json<CreateProductRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let input = NewProduct {
        name: body.name.clone(),
        description: body.description.clone(),
        price: body.price,
        category: body.category.clone(),
        image_url: body.image_url.clone(),
        in_stock: body.in_stock.unwrap_or(true),
    };

    match storage.insert_product(input).await {
        Ok(model) => Ok(created_response(
            ProductResponse::from(model),
            "Product created successfully",
        )),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// PUT /api/products/{id} (admin)
pub async fn update_product(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let patch = ProductPatch {
        name: body.name.clone(),
        description: body.description.clone(),
        price: body.price,
        category: body.category.clone(),
        image_url: body.image_url.clone(),
        in_stock: body.in_stock,
    };

    match storage.update_product(&path.into_inner(), patch).await {
        Ok(Some(model)) => Ok(success_with_message(
            ProductResponse::from(model),
            "Product updated successfully",
        )),
        Ok(None) => Ok(error_response(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// DELETE /api/products/{id} (admin)
pub async fn delete_product(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    media: web::Data<Arc<MediaStore>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    let id = path.into_inner();

    let product = match storage.get_product(&id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Ok(error_response(StatusCode::NOT_FOUND, "Product not found"));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    };

    // Stored image goes first; a storage hiccup should not block the delete
    if !product.image_url.is_empty() {
        if let Err(e) = media.delete_by_url(&product.image_url).await {
            warn!("Failed to delete product image {}: {}", product.image_url, e);
        }
    }

    match storage.delete_product(&id).await {
        Ok(true) => Ok(message_response("Product deleted successfully")),
        Ok(false) => Ok(error_response(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => Ok(error_from_finitura(&e)),
    }
}

/// PATCH /api/products/{id} — public engagement bump
pub async fn bump_product_stat(
    path: web::Path<String>,
    body: web::Json<StatActionRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    let stat = match body.action.as_str() {
        "like" => ProductStat::Likes,
        "share" => ProductStat::Shares,
        "contact" => ProductStat::Contacts,
        _ => {
            return Ok(error_response(StatusCode::BAD_REQUEST, "Invalid action"));
        }
    };

    let id = path.into_inner();

    match storage.get_product(&id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(error_response(StatusCode::NOT_FOUND, "Product not found"));
        }
        Err(e) => return Ok(error_from_finitura(&e)),
    }

    analytics.increment_product_stat(&id, stat).await;

    Ok(message_response(format!("Product {} recorded", body.action)))
}

/// `/products` routes
pub fn routes() -> actix_web::Scope {
    web::scope("/products")
        .route("", web::get().to(list_products))
        .route("", web::post().to(create_product))
        .route("/{id}", web::get().to(get_product))
        .route("/{id}", web::put().to(update_product))
        .route("/{id}", web::delete().to(delete_product))
        .route("/{id}", web::patch().to(bump_product_stat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(
            ProductCategory::from_str("liquid-metal").unwrap(),
            ProductCategory::LiquidMetal
        );
        assert!(ProductCategory::from_str("chrome").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateProductRequest {
            name: "Marmorino Classic".to_string(),
            description: "Lime-based polished plaster for interior walls".to_string(),
            price: 45000.0,
            category: "marmorino".to_string(),
            image_url: "https://cdn.example.org/products/m1.webp".to_string(),
            in_stock: None,
        };
        assert!(valid.validate().is_ok());

        let mut bad_price = CreateProductRequest {
            price: 0.0,
            ..clone_request(&valid)
        };
        assert!(bad_price.validate().is_err());
        bad_price.price = -5.0;
        assert!(bad_price.validate().is_err());

        let bad_category = CreateProductRequest {
            category: "granite".to_string(),
            ..clone_request(&valid)
        };
        assert!(bad_category.validate().is_err());

        let bad_url = CreateProductRequest {
            image_url: "not a url".to_string(),
            ..clone_request(&valid)
        };
        assert!(bad_url.validate().is_err());

        let short_name = CreateProductRequest {
            name: "X".to_string(),
            ..clone_request(&valid)
        };
        assert!(short_name.validate().is_err());
    }

    fn clone_request(req: &CreateProductRequest) -> CreateProductRequest {
        CreateProductRequest {
            name: req.name.clone(),
            description: req.description.clone(),
            price: req.price,
            category: req.category.clone(),
            image_url: req.image_url.clone(),
            in_stock: req.in_stock,
        }
    }
}
