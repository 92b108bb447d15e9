//! Admin authentication endpoints
//!
//! Credential login against the admins table, JWT cookie session with
//! refresh rotation, and the code-guarded registration bootstrap.

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use governor::middleware::NoOpMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::helpers::{
    created_response, error_response, is_admin, message_response, success_response, CookieBuilder,
};
use crate::api::jwt::get_jwt_service;
use crate::errors::FinituraError;
use crate::storage::{NewAdmin, SeaOrmStorage};
use crate::utils::password::{check_password_strength, hash_password, verify_password};
use crate::utils::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub registration_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo {
    expires_in: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminInfo {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: String,
}

/// Rate-limit key: the TCP peer address. Headers are not trusted here.
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.connection_info()
            .peer_addr()
            .map(|addr| addr.to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

/// 1 req/s refill with a burst of 5, keyed per client IP
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// POST /api/auth/login
pub async fn login(
    login_body: web::Json<LoginRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let admin = match storage.find_admin_by_email(&login_body.email).await {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            warn!("Login failed: unknown email {}", login_body.email);
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ));
        }
        Err(e) => {
            error!("Login lookup failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication error",
            ));
        }
    };

    let password_valid = match verify_password(&login_body.password, &admin.password) {
        Ok(valid) => valid,
        Err(e) => {
            error!("Password verification error: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication error",
            ));
        }
    };

    if !password_valid {
        warn!("Login failed: wrong password for {}", admin.email);
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    info!("Admin login successful: {}", admin.email);

    let jwt_service = get_jwt_service();
    let access_token = match jwt_service.generate_access_token(&admin.email) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };

    let refresh_token = match jwt_service.generate_refresh_token(&admin.email) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate refresh token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };

    let cookie_builder = CookieBuilder::from_config();
    let access_cookie = cookie_builder.build_access_cookie(access_token);
    let refresh_cookie = cookie_builder.build_refresh_cookie(refresh_token);

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(super::helpers::ApiResponse {
            success: true,
            data: Some(SessionInfo {
                expires_in: cookie_builder.access_token_minutes() * 60,
            }),
            message: Some("Login successful".to_string()),
            error: None,
        }))
}

/// POST /api/auth/refresh — rotate both tokens from a valid refresh cookie
pub async fn refresh_session(req: HttpRequest) -> ActixResult<HttpResponse> {
    let cookie_builder = CookieBuilder::from_config();

    let refresh_token = match req.cookie(cookie_builder.refresh_cookie_name()) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!("Refresh token not found in cookie");
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                "Refresh token not found",
            ));
        }
    };

    let jwt_service = get_jwt_service();
    let claims = match jwt_service.validate_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Invalid refresh token: {}", e);
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid refresh token",
            ));
        }
    };

    // Sliding expiration: both tokens are reissued
    let access_token = match jwt_service.generate_access_token(&claims.sub) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };
    let new_refresh_token = match jwt_service.generate_refresh_token(&claims.sub) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate refresh token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };

    info!("Session refreshed for {}", claims.sub);

    Ok(HttpResponse::Ok()
        .cookie(cookie_builder.build_access_cookie(access_token))
        .cookie(cookie_builder.build_refresh_cookie(new_refresh_token))
        .json(super::helpers::ApiResponse {
            success: true,
            data: Some(SessionInfo {
                expires_in: cookie_builder.access_token_minutes() * 60,
            }),
            message: Some("Session refreshed".to_string()),
            error: None,
        }))
}

/// POST /api/auth/logout — expire both cookies
pub async fn logout(_req: HttpRequest) -> ActixResult<HttpResponse> {
    let cookie_builder = CookieBuilder::from_config();

    Ok(HttpResponse::Ok()
        .cookie(cookie_builder.build_expired_access_cookie())
        .cookie(cookie_builder.build_expired_refresh_cookie())
        .json(super::helpers::ApiResponse::<()> {
            success: true,
            data: None,
            message: Some("Logged out".to_string()),
            error: None,
        }))
}

/// GET /api/auth/verify
pub async fn verify_session(req: HttpRequest) -> ActixResult<HttpResponse> {
    if is_admin(&req) {
        Ok(message_response("Session valid"))
    } else {
        Ok(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// POST /api/auth/register — one-time bootstrap guarded by a code
pub async fn register(
    body: web::Json<RegisterRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<HttpResponse> {
    let expected_code = &crate::config::get_config().auth.registration_code;
    if expected_code.is_empty() {
        return Ok(error_response(
            StatusCode::FORBIDDEN,
            "Registration is disabled",
        ));
    }
    if body.registration_code.as_deref() != Some(expected_code.as_str()) {
        return Ok(error_response(
            StatusCode::FORBIDDEN,
            "Invalid registration code",
        ));
    }

    if body.name.chars().count() < 2 || body.name.chars().count() > 50 {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Name must be between 2 and 50 characters",
        ));
    }
    if !is_valid_email(&body.email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid email address",
        ));
    }
    if let Err(reason) = check_password_strength(&body.password) {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }
    if body.password != body.confirm_password {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Passwords don't match",
        ));
    }

    let password_hash = match hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Password hashing failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create admin account",
            ));
        }
    };

    match storage
        .insert_admin(NewAdmin {
            name: body.name.clone(),
            email: body.email.clone(),
            password_hash,
        })
        .await
    {
        Ok(admin) => Ok(created_response(
            AdminInfo {
                id: admin.id,
                name: admin.name,
                email: admin.email,
                role: admin.role,
                created_at: admin.created_at.to_rfc3339(),
            },
            "Admin account created successfully",
        )),
        Err(e @ FinituraError::Conflict(_)) => {
            Ok(error_response(StatusCode::CONFLICT, e.message()))
        }
        Err(e) => {
            error!("Admin registration failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create admin account",
            ))
        }
    }
}

/// GET /api/auth/me — identity of the current session
pub async fn whoami(req: HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if let Ok(claims) = get_jwt_service().validate_access_token(token) {
                    return Ok(success_response(serde_json::json!({ "email": claims.sub })));
                }
            }
        }
    }
    if let Some(cookie) = req.cookie(crate::api::constants::ACCESS_COOKIE_NAME) {
        if let Ok(claims) = get_jwt_service().validate_access_token(cookie.value()) {
            return Ok(success_response(serde_json::json!({ "email": claims.sub })));
        }
    }
    Ok(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

/// `/auth` routes
pub fn routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/refresh", web::post().to(refresh_session))
        .route("/logout", web::post().to(logout))
        .route("/verify", web::get().to(verify_session))
        .route("/register", web::post().to(register))
        .route("/me", web::get().to(whoami))
}
