//! API endpoint URL builders
//!
//! Helper functions to construct endpoint URLs from a server base URL.

use hrsync_common::wire::{EMPLOYEES_PATH, TOKEN_PATH};

/// Build token exchange URL
pub fn token_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH)
}

/// Build bulk employee creation URL
pub fn employees_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), EMPLOYEES_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        assert_eq!(token_url("http://localhost:8000"), "http://localhost:8000/api/token/");
    }

    #[test]
    fn test_employees_url() {
        assert_eq!(
            employees_url("https://hr.example.com"),
            "https://hr.example.com/api/employees/"
        );
    }

    #[test]
    fn test_trailing_slash_is_not_doubled() {
        assert_eq!(token_url("http://localhost:8000/"), "http://localhost:8000/api/token/");
        assert_eq!(
            employees_url("http://localhost:8000//"),
            "http://localhost:8000/api/employees/"
        );
    }
}
