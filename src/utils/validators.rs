//! Identity-field normalization and pattern checks for member registration.

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    static ref WHATSAPP_REGEX: regex::Regex =
        regex::Regex::new(r"^\d{10,15}$").unwrap();
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_whatsapp(whatsapp: &str) -> String {
    whatsapp.trim().to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_whatsapp(whatsapp: &str) -> bool {
    WHATSAPP_REGEX.is_match(whatsapp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("nodomain@"));
    }

    #[test]
    fn test_whatsapp_validation() {
        assert!(is_valid_whatsapp("9876543210"));
        assert!(is_valid_whatsapp("919876543210"));
        assert!(!is_valid_whatsapp("12345"));
        assert!(!is_valid_whatsapp("1234567890123456"));
        assert!(!is_valid_whatsapp("+919876543210"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_whatsapp(" 9876543210 "), "9876543210");
    }
}
