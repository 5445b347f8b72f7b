use axum::http::{header::COOKIE, HeaderMap};
use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 15;
pub const MAX_ADDRESS_LEN: usize = 255;

pub const EMAIL_COOKIE: &str = "email";
pub const EMAIL_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;

pub fn require_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must not exceed {max} characters"));
    }

    Ok(())
}

/// Trims and collapses runs of inner whitespace. Profile fields are stored
/// normalized so a double-spaced name does not defeat the length checks.
pub fn normalize(input: &str) -> String {
    let collapse = Regex::new(r"\s+").unwrap();
    collapse.replace_all(input.trim(), " ").into_owned()
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();

    if value.is_empty() { None } else { Some(value) }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };

        for pair in header.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

pub fn build_cookie(name: &str, value: &str, max_age: i64, http_only: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; SameSite=Lax");

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    cookie
}

pub fn expire_cookie(name: &str) -> String {
    build_cookie(name, "", 0, true)
}

pub fn password_digest(secret: &str, password: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(password.as_bytes());

    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn length_check_counts_characters() {
        assert!(require_length("Full name", &"a".repeat(255), MAX_NAME_LEN).is_ok());
        let err = require_length("Full name", &"a".repeat(300), MAX_NAME_LEN).unwrap_err();
        assert_eq!(err, "Full name must not exceed 255 characters");
    }

    #[test]
    fn phone_limit_is_fifteen() {
        assert!(require_length("Phone", "012345678901234", MAX_PHONE_LEN).is_ok());
        assert!(require_length("Phone", "0123456789012345", MAX_PHONE_LEN).is_err());
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  An   Nguyen "), "An Nguyen");
        assert_eq!(normalize("one\t two"), "one two");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn non_blank_rejects_whitespace_only() {
        assert_eq!(non_blank(Some("  hi ")), Some("hi"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("sid=abc123; email=a%40b.c; theme=dark"),
        );

        assert_eq!(cookie_value(&headers, "sid").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "email").as_deref(), Some("a%40b.c"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn build_cookie_includes_attributes() {
        let cookie = build_cookie(EMAIL_COOKIE, "a@b.c", EMAIL_COOKIE_MAX_AGE, false);
        assert_eq!(cookie, "email=a@b.c; Path=/; Max-Age=2592000; SameSite=Lax");

        let session = build_cookie("sid", "x", 60, true);
        assert!(session.ends_with("; HttpOnly"));
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        assert!(expire_cookie("sid").contains("Max-Age=0"));
    }

    #[test]
    fn password_digest_is_stable_and_secret_sensitive() {
        let a = password_digest("secret", "hunter2");
        let b = password_digest("secret", "hunter2");
        let c = password_digest("other", "hunter2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
