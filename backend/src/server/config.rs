//! Application configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_PAGE_SIZE: u32 = 15;
const DEFAULT_SET_PASSWORD_BASE_URL: &str = "http://localhost:8080";

/// Configuration values for the user administration service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_ADMIN")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Page size for user listings.
    pub page_size: Option<u32>,
    /// Base URL rendered into set-password links.
    pub set_password_base_url: Option<String>,
    /// Set the `Secure` flag on session cookies.
    #[ortho_config(skip_cli, default = true)]
    pub cookie_secure: Option<bool>,
}

impl AppSettings {
    /// Configured bind address, falling back to the local default.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured listing page size, falling back to the default.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Configured set-password base URL, falling back to the default.
    #[must_use]
    pub fn set_password_base_url(&self) -> &str {
        self.set_password_base_url
            .as_deref()
            .unwrap_or(DEFAULT_SET_PASSWORD_BASE_URL)
    }

    /// Whether session cookies carry the `Secure` flag; on unless
    /// explicitly disabled.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("USER_ADMIN_BIND_ADDR", None::<String>),
            ("USER_ADMIN_PAGE_SIZE", None::<String>),
            ("USER_ADMIN_SET_PASSWORD_BASE_URL", None::<String>),
            ("USER_ADMIN_COOKIE_SECURE", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(
            settings.set_password_base_url(),
            DEFAULT_SET_PASSWORD_BASE_URL
        );
        assert!(settings.cookie_secure());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_ADMIN_BIND_ADDR", Some("0.0.0.0:9090".to_owned())),
            ("USER_ADMIN_PAGE_SIZE", Some("25".to_owned())),
            (
                "USER_ADMIN_SET_PASSWORD_BASE_URL",
                Some("https://admin.example.com".to_owned()),
            ),
            ("USER_ADMIN_COOKIE_SECURE", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:9090");
        assert_eq!(settings.page_size(), 25);
        assert_eq!(
            settings.set_password_base_url(),
            "https://admin.example.com"
        );
        assert!(!settings.cookie_secure());
    }
}
