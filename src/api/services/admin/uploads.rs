//! Image upload pipeline
//!
//! `POST /api/upload` takes a multipart form (file + target folder) and
//! pushes the image into the object store. `GET /api/upload` hands out a
//! presigned PUT URL so the admin panel can upload directly from the
//! browser. Both require an admin session.

use std::str::FromStr;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::helpers::{error_response, is_admin, success_response, unauthorized_response};
use crate::services::media::{
    is_allowed_type, unique_key, MediaFolder, MediaStore, MAX_UPLOAD_BYTES,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResult {
    url: String,
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignQuery {
    pub filename: String,
    pub folder: Option<String>,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignResult {
    upload_url: String,
    public_url: String,
    filename: String,
    expires_in: u64,
}

fn parse_folder(raw: Option<&str>) -> Result<MediaFolder, HttpResponse> {
    match raw {
        None => Ok(MediaFolder::Products),
        Some(text) => MediaFolder::from_str(text.trim()).map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Invalid folder. Allowed: products, gallery, reviews",
            )
        }),
    }
}

/// POST /api/upload (admin)
pub async fn upload_image(
    req: HttpRequest,
    mut payload: Multipart,
    media: web::Data<Arc<MediaStore>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    let mut file_bytes: Vec<u8> = Vec::new();
    let mut file_name = String::new();
    let mut content_type = String::new();
    let mut folder_raw: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("Invalid multipart data: {}", e),
                ));
            }
        };

        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();
                content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_default();

                while let Some(chunk) = field.next().await {
                    let chunk = match chunk {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            return Ok(error_response(
                                StatusCode::BAD_REQUEST,
                                &format!("Failed to read file data: {}", e),
                            ));
                        }
                    };
                    if file_bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                        return Ok(error_response(
                            StatusCode::BAD_REQUEST,
                            "File too large. Maximum size is 10MB",
                        ));
                    }
                    file_bytes.extend_from_slice(&chunk);
                }
            }
            "folder" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    if let Ok(chunk) = chunk {
                        raw.extend_from_slice(&chunk);
                    }
                }
                folder_raw = Some(String::from_utf8_lossy(&raw).into_owned());
            }
            // Unknown fields are drained and ignored
            _ => while field.next().await.is_some() {},
        }
    }

    if file_bytes.is_empty() {
        return Ok(error_response(StatusCode::BAD_REQUEST, "No file provided"));
    }
    if !is_allowed_type(&content_type) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid file type. Allowed: JPEG, PNG, WebP, AVIF",
        ));
    }
    let folder = match parse_folder(folder_raw.as_deref()) {
        Ok(folder) => folder,
        Err(response) => return Ok(response),
    };

    let key = unique_key(&file_name, folder);
    match media.upload(file_bytes, &key, &content_type).await {
        Ok(url) => {
            info!("Image uploaded: {}", key);
            Ok(success_response(UploadResult { url, key }))
        }
        Err(e) => {
            error!("Image upload failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to upload image",
            ))
        }
    }
}

/// GET /api/upload (admin) — presigned PUT URL for client-side upload
pub async fn presign_upload(
    req: HttpRequest,
    query: web::Query<PresignQuery>,
    media: web::Data<Arc<MediaStore>>,
) -> ActixResult<HttpResponse> {
    if !is_admin(&req) {
        return Ok(unauthorized_response());
    }

    if !is_allowed_type(&query.content_type) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid file type. Allowed: JPEG, PNG, WebP, AVIF",
        ));
    }
    let folder = match parse_folder(query.folder.as_deref()) {
        Ok(folder) => folder,
        Err(response) => return Ok(response),
    };

    let key = unique_key(&query.filename, folder);
    match media.presign_put(&key, &query.content_type).await {
        Ok(upload_url) => Ok(success_response(PresignResult {
            upload_url,
            public_url: media.public_url_for(&key),
            filename: key,
            expires_in: media.presign_expiry_secs(),
        })),
        Err(e) => {
            error!("Presign failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate upload URL",
            ))
        }
    }
}

/// `/upload` routes
pub fn routes() -> actix_web::Scope {
    web::scope("/upload")
        .route("", web::post().to(upload_image))
        .route("", web::get().to(presign_upload))
}
