//! Transactional email
//!
//! Thin client for an HTTP mail provider (Resend-compatible JSON API).
//! Contact notifications are sent synchronously (the contact endpoint
//! reports delivery failure); auto-replies and review notifications are
//! fired from spawned tasks and only logged on failure.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ContactConfig;
use crate::errors::{FinituraError, Result};

/// A contact form submission, as forwarded to the studio inbox
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

pub struct EmailNotifier {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    admin_to: String,
}

impl EmailNotifier {
    pub fn from_config(config: &ContactConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
            admin_to: config.mail_to.clone(),
        }
    }

    /// Mail sending is opt-in; without an endpoint and key the notifier
    /// rejects every send so callers can surface the misconfiguration.
    pub fn is_enabled(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty()
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        if !self.is_enabled() {
            return Err(FinituraError::notification(
                "Mail provider not configured".to_string(),
            ));
        }

        let payload = MailPayload {
            from: &self.from,
            to,
            subject,
            html,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FinituraError::notification(format!("Mail request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinituraError::notification(format!(
                "Mail provider returned {}: {}",
                status, body
            )));
        }

        debug!("Mail sent to {} ({})", to, subject);
        Ok(())
    }

    /// Forward a contact form submission to the studio inbox
    pub async fn send_contact_notification(&self, msg: &ContactMessage) -> Result<()> {
        let subject = msg
            .subject
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("New contact form message from {}", msg.name));

        let mut html = format!(
            "<h2>Contact form submission</h2>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>",
            msg.name, msg.email
        );
        if let Some(ref phone) = msg.phone {
            html.push_str(&format!("<p><strong>Phone:</strong> {}</p>", phone));
        }
        if let (Some(id), Some(name)) = (&msg.product_id, &msg.product_name) {
            html.push_str(&format!(
                "<p><strong>Product:</strong> {} ({})</p>",
                name, id
            ));
        }
        html.push_str(&format!(
            "<p><strong>Message:</strong></p><p>{}</p>",
            msg.message
        ));

        self.send(&self.admin_to, &subject, &html).await?;
        info!("Contact notification delivered for {}", msg.email);
        Ok(())
    }

    /// Confirmation mail back to the customer
    pub async fn send_auto_reply(&self, to: &str, name: &str) -> Result<()> {
        let html = format!(
            "<p>Hello {},</p>\
             <p>Thank you for reaching out. We received your message and will \
             get back to you within one business day.</p>\
             <p>— The studio team</p>",
            name
        );
        self.send(to, "We received your message", &html).await
    }

    /// Heads-up to the operators that a review awaits moderation
    pub async fn send_review_notification(
        &self,
        reviewer_name: &str,
        rating: i32,
        message: &str,
        review_id: &str,
    ) -> Result<()> {
        let html = format!(
            "<h2>New review pending approval</h2>\
             <p><strong>From:</strong> {}</p>\
             <p><strong>Rating:</strong> {}/5</p>\
             <p><strong>Message:</strong></p><p>{}</p>\
             <p>Review id: {}</p>",
            reviewer_name, rating, message, review_id
        );
        self.send(&self.admin_to, "New review awaiting moderation", &html)
            .await
    }
}
