use crate::{env_or_default, split_list, ConfigError, FromEnv};

pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";
pub const DEFAULT_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const DEFAULT_ALLOWED_HEADERS: &str = "Content-Type";

/// Cross-origin policy applied to every response
///
/// Defaults are fully permissive: any origin, the CRUD verbs plus OPTIONS,
/// and the `Content-Type` request header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins; `*` matches any origin
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl CorsConfig {
    pub fn permissive() -> Self {
        Self {
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGIN),
            allowed_methods: split_list(DEFAULT_ALLOWED_METHODS),
            allowed_headers: split_list(DEFAULT_ALLOWED_HEADERS),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::permissive()
    }
}

impl FromEnv for CorsConfig {
    /// Reads comma-separated lists:
    /// - CORS_ALLOWED_ORIGIN: defaults to `*`
    /// - CORS_ALLOWED_METHODS: defaults to `GET, POST, PUT, DELETE, OPTIONS`
    /// - CORS_ALLOWED_HEADERS: defaults to `Content-Type`
    fn from_env() -> Result<Self, ConfigError> {
        let read = |key: &str, default: &str| -> Result<Vec<String>, ConfigError> {
            let items = split_list(&env_or_default(key, default));
            if items.is_empty() {
                return Err(ConfigError::ParseError {
                    key: key.to_string(),
                    details: "list cannot be empty".to_string(),
                });
            }
            Ok(items)
        };

        Ok(Self {
            allowed_origins: read("CORS_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN)?,
            allowed_methods: read("CORS_ALLOWED_METHODS", DEFAULT_ALLOWED_METHODS)?,
            allowed_headers: read("CORS_ALLOWED_HEADERS", DEFAULT_ALLOWED_HEADERS)?,
        })
    }
}
