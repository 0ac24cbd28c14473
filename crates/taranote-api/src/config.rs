//! Server configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use tracing::warn;

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Default upload size limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where the HTML shell loads its scripts and styles from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetMode {
    /// Load from a running Vite dev server.
    Dev { server_url: String },
    /// Resolve hashed file names through a build manifest.
    Manifest { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Asset version sent in every page envelope.
    pub asset_version: String,
    pub asset_mode: AssetMode,
    pub upload_dir: PathBuf,
    /// Public URL prefix under which uploaded files are served.
    pub upload_url_prefix: String,
    pub docs_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_cookie_secure: bool,
    pub allowed_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/taranote".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            asset_version: "v1".to_string(),
            asset_mode: AssetMode::Dev {
                server_url: "http://localhost:5173".to_string(),
            },
            upload_dir: PathBuf::from("./public/uploads"),
            upload_url_prefix: "/public/uploads".to_string(),
            docs_dir: PathBuf::from("./docs"),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_cookie_secure: false,
            allowed_origins: vec![HeaderValue::from_static("http://localhost:5173")],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            db_max_connections: taranote_db::pool::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset keys keep
    /// their defaults; unparseable numbers fall back with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = get("APP_ENV").is_some_and(|v| v == "production");
        let asset_mode = if production {
            AssetMode::Manifest {
                path: get("VITE_MANIFEST")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("public/build/manifest.json")),
            }
        } else {
            AssetMode::Dev {
                server_url: get("VITE_DEV_SERVER")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:5173".to_string()),
            }
        };

        Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port),
            asset_version: get("ASSET_VERSION").unwrap_or(defaults.asset_version),
            asset_mode,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_url_prefix: get("UPLOAD_URL_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upload_url_prefix),
            docs_dir: get("DOCS_DIR").map(PathBuf::from).unwrap_or(defaults.docs_dir),
            session_ttl: Duration::from_secs(parse_or(
                "SESSION_TTL_SECS",
                get("SESSION_TTL_SECS"),
                DEFAULT_SESSION_TTL_SECS,
            )),
            session_cookie_secure: get("SESSION_COOKIE_SECURE")
                .is_some_and(|v| v == "true" || v == "1"),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|v| parse_allowed_origins(&v))
                .unwrap_or(defaults.allowed_origins),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            ),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            ),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid numeric setting, using default");
            default
        }),
    }
}

/// Parse a comma-separated origin allow-list, skipping invalid entries.
///
/// ```text
/// ALLOWED_ORIGINS=https://notes.example.com,http://localhost:5173
/// ```
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.asset_version, "v1");
        assert_eq!(config.session_ttl, Duration::from_secs(86400));
        assert_eq!(config.upload_url_prefix, "/public/uploads");
        assert!(matches!(config.asset_mode, AssetMode::Dev { .. }));
    }

    #[test]
    fn test_production_uses_manifest() {
        let config = config_from(&[("APP_ENV", "production"), ("VITE_MANIFEST", "/srv/m.json")]);
        assert_eq!(
            config.asset_mode,
            AssetMode::Manifest {
                path: PathBuf::from("/srv/m.json")
            }
        );
    }

    #[test]
    fn test_invalid_number_falls_back() {
        let config = config_from(&[("PORT", "eighty"), ("SESSION_TTL_SECS", "60")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_allowed_origins_skips_blanks() {
        let origins = parse_allowed_origins("https://a.example, ,http://localhost:5173");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://a.example");
    }
}
