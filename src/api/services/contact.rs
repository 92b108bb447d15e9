//! Contact form endpoint
//!
//! Forwards an inquiry by email, hands back a WhatsApp deep link, or
//! both. The contact_form tracking event is recorded for every valid
//! submission; whatsapp_click only when a link is produced. Mail
//! delivery failure is fatal only when email was the sole channel.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::admin::helpers::error_response;
use crate::analytics::{client_info, EventKind, TrackOptions};
use crate::services::notify::whatsapp;
use crate::services::{AnalyticsService, ContactMessage, EmailNotifier};
use crate::storage::SeaOrmStorage;
use crate::utils::is_valid_email;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub send_via: String,
}

impl ContactRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.chars().count() < 2 || self.name.chars().count() > 50 {
            return Err("Name must be between 2 and 50 characters".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err("Invalid email address".to_string());
        }
        if let Some(ref subject) = self.subject {
            if subject.chars().count() > 100 {
                return Err("Subject must be at most 100 characters".to_string());
            }
        }
        if self.message.chars().count() < 10 || self.message.chars().count() > 1000 {
            return Err("Message must be between 10 and 1000 characters".to_string());
        }
        if !matches!(self.send_via.as_str(), "email" | "whatsapp" | "both") {
            return Err("sendVia must be one of: email, whatsapp, both".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_sent: Option<bool>,
}

/// POST /api/contact
pub async fn submit_contact(
    req: HttpRequest,
    body: web::Json<ContactRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<Arc<AnalyticsService>>,
    mailer: web::Data<Arc<EmailNotifier>>,
) -> ActixResult<HttpResponse> {
    if let Err(reason) = body.validate() {
        return Ok(error_response(StatusCode::BAD_REQUEST, &reason));
    }

    let config = crate::config::get_config();
    let info = client_info(req.headers(), config.ip_salt());

    analytics
        .track_event(
            EventKind::ContactForm,
            "/contact",
            TrackOptions {
                product_id: body.product_id.clone(),
                metadata: Some(serde_json::json!({ "sendVia": body.send_via })),
                user_agent: Some(info.user_agent.clone()),
                ip_hash: Some(info.ip_hash.clone()),
            },
        )
        .await;

    let mut response = ContactResponse {
        success: true,
        message: "Contact form processed successfully".to_string(),
        whatsapp_url: None,
        email_sent: None,
    };

    if matches!(body.send_via.as_str(), "email" | "both") {
        let msg = ContactMessage {
            name: body.name.clone(),
            email: body.email.clone(),
            phone: body.phone.clone(),
            subject: body.subject.clone(),
            message: body.message.clone(),
            product_id: body.product_id.clone(),
            product_name: body.product_name.clone(),
        };

        match mailer.send_contact_notification(&msg).await {
            Ok(()) => {
                response.email_sent = Some(true);

                // Auto-reply to the customer, fire-and-forget
                let notifier = mailer.get_ref().clone();
                let (to, name) = (body.email.clone(), body.name.clone());
                tokio::spawn(async move {
                    if let Err(e) = notifier.send_auto_reply(&to, &name).await {
                        error!("Auto-reply failed: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Contact email failed: {}", e);
                response.email_sent = Some(false);
                if body.send_via == "email" {
                    return Ok(error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to send email. Please try again or use WhatsApp.",
                    ));
                }
            }
        }
    }

    if matches!(body.send_via.as_str(), "whatsapp" | "both") {
        analytics
            .track_event(
                EventKind::WhatsappClick,
                "/contact",
                TrackOptions {
                    product_id: body.product_id.clone(),
                    user_agent: Some(info.user_agent.clone()),
                    ip_hash: Some(info.ip_hash.clone()),
                    ..Default::default()
                },
            )
            .await;

        let number = &config.contact.whatsapp_number;
        let url = match (&body.product_id, &body.product_name) {
            (Some(id), Some(name)) => {
                // Product inquiry carries the current price when the row
                // still exists
                let price = storage
                    .get_product(id)
                    .await
                    .ok()
                    .flatten()
                    .map(|p| p.price);
                whatsapp::product_inquiry_url(number, name, id, price)
            }
            _ => whatsapp::contact_form_url(
                number,
                &body.name,
                Some(body.email.as_str()),
                body.phone.as_deref(),
                &body.message,
            ),
        };

        response.whatsapp_url = Some(url);
        response.message = if body.send_via == "whatsapp" {
            "Opening WhatsApp...".to_string()
        } else {
            "Email sent! Opening WhatsApp...".to_string()
        };
    }

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
            phone: None,
            subject: None,
            message: "I would like a quote for my living room.".to_string(),
            product_id: None,
            product_name: None,
            send_via: "whatsapp".to_string(),
        }
    }

    #[test]
    fn test_valid_contact_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_send_via_must_be_known() {
        let mut req = valid_request();
        req.send_via = "carrier-pigeon".to_string();
        assert!(req.validate().is_err());
        for channel in ["email", "whatsapp", "both"] {
            req.send_via = channel.to_string();
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_email_shape_checked() {
        let mut req = valid_request();
        req.email = "nope".to_string();
        assert!(req.validate().is_err());
    }
}
