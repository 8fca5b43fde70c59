//! Email-verification helpers: address syntax, code generation, limits.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Minutes before a verification code expires.
pub const CODE_EXPIRY_MINUTES: i64 = 10;

/// Maximum failed attempts before a code is invalidated.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex is valid")
    })
}

/// Syntactic email address check.
pub fn is_valid_email(address: &str) -> bool {
    email_regex().is_match(address)
}

/// Canonical form used as the lookup key: trimmed and lowercased.
pub fn normalize_email(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Generate a random numeric verification code of [`CODE_LENGTH`] digits.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Check that a submitted code has the expected shape before hitting storage.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("restorer@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@.com"));
    }

    #[test]
    fn normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..20 {
            let code = generate_code();
            assert!(is_well_formed_code(&code), "bad code: {code}");
        }
    }

    #[test]
    fn code_shape_check() {
        assert!(is_well_formed_code("123456"));
        assert!(!is_well_formed_code("12345"));
        assert!(!is_well_formed_code("1234567"));
        assert!(!is_well_formed_code("12345a"));
    }
}
