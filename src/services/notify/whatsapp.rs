//! WhatsApp deep links
//!
//! Builds wa.me URLs with pre-filled messages for the contact flow.
//! Pure string work; the client opens the link, nothing is sent from
//! the server.

/// Strip everything but digits for the wa.me path segment
fn clean_phone_number(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Base wa.me URL, optionally with a pre-filled message
pub fn whatsapp_url(number: &str, message: Option<&str>) -> String {
    let base = format!("https://wa.me/{}", clean_phone_number(number));
    match message {
        Some(msg) => format!("{}?text={}", base, urlencoding::encode(msg.trim())),
        None => base,
    }
}

/// Pre-filled product inquiry
pub fn product_inquiry_url(
    number: &str,
    product_name: &str,
    product_id: &str,
    price: Option<f64>,
) -> String {
    let price_text = price
        .map(|p| format!(" (NGN {:.2})", p))
        .unwrap_or_default();

    let message = format!(
        "Hello! I'm interested in the following product:\n\n\
         *Product:* {}{}\n\
         *ID:* {}\n\n\
         I would like to know more about availability, delivery options and current promotions.\n\n\
         Thank you!",
        product_name, price_text, product_id
    );

    whatsapp_url(number, Some(&message))
}

/// Pre-filled contact form hand-off
pub fn contact_form_url(
    number: &str,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    message: &str,
) -> String {
    let mut lines = vec![
        "Hello! Contact form submission:".to_string(),
        String::new(),
        format!("*Name:* {}", name),
    ];
    if let Some(email) = email.filter(|s| !s.is_empty()) {
        lines.push(format!("*Email:* {}", email));
    }
    if let Some(phone) = phone.filter(|s| !s.is_empty()) {
        lines.push(format!("*Phone:* {}", phone));
    }
    lines.push(String::new());
    lines.push("*Message:*".to_string());
    lines.push(message.to_string());

    whatsapp_url(number, Some(&lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_phone_number() {
        assert_eq!(clean_phone_number("+234 903 682-6272"), "2349036826272");
    }

    #[test]
    fn test_whatsapp_url_without_message() {
        assert_eq!(
            whatsapp_url("+2349036826272", None),
            "https://wa.me/2349036826272"
        );
    }

    #[test]
    fn test_whatsapp_url_encodes_message() {
        let url = whatsapp_url("+234", Some("hello world & more"));
        assert!(url.starts_with("https://wa.me/234?text="));
        assert!(url.contains("hello%20world%20%26%20more"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_product_inquiry_url_includes_details() {
        let url = product_inquiry_url("+234", "Marmorino Classic", "p1", Some(45000.0));
        assert!(url.contains("Marmorino%20Classic"));
        assert!(url.contains("p1"));
        assert!(url.contains("45000.00"));
    }

    #[test]
    fn test_contact_form_url_skips_empty_fields() {
        let url = contact_form_url("+234", "Ada", None, Some(""), "Need a quote");
        assert!(!url.contains("Phone"));
        assert!(!url.contains("Email"));
        assert!(url.contains("Ada"));
    }
}
