pub mod ip;
pub mod password;

use rand::RngExt;

/// Generate a URL-safe random token of `len` bytes, hex-encoded
pub fn generate_secure_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| format!("{:02x}", rng.random::<u8>()))
        .collect()
}

/// Shallow email shape check: one '@' with a dotted, non-empty domain
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token_length() {
        let token = generate_secure_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_secure_token_unique() {
        assert_ne!(generate_secure_token(16), generate_secure_token(16));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@studio.test"));
        assert!(is_valid_email("a.b+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("@example.org"));
        assert!(!is_valid_email("a b@example.org"));
    }
}
