use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SHELF_ENV";
const CONFIG_DIR_ENV: &str = "SHELF_CONFIG_DIR";

/// Variables understood by earlier deployments, mapped onto settings keys.
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("KEYDB_HOST", "store.host"),
    ("KEYDB_PORT", "store.port"),
    ("KEYDB_PASSWORD", "store.password"),
    ("API_URL", "web.api_url"),
];

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub web: WebSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `SHELF_*` variables and finally the legacy variable names.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let mut builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("SHELF")
                    .prefix_separator("_")
                    .separator("__"),
            );

        for &(var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder
                .set_override_option(key, std::env::var(var).ok())
                .with_context(|| format!("failed to apply {var}"))?;
        }

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = match environment.as_str() {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        Ok(settings)
    }
}

/// Listener configuration handed to the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
    pub cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15000
}

/// Settings for the books API service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "ApiSettings::default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "ApiSettings::default_cors")]
    pub cors: bool,
}

impl ApiSettings {
    fn default_port() -> u16 {
        5001
    }

    fn default_cors() -> bool {
        true
    }

    pub fn server(&self) -> ServerSettings {
        ServerSettings {
            host: self.host.clone(),
            port: self.port,
            request_timeout_ms: self.request_timeout_ms,
            cors: self.cors,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            cors: Self::default_cors(),
        }
    }
}

/// Settings for the HTML frontend service.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "WebSettings::default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Base URL of the books API the frontend talks to.
    #[serde(default = "WebSettings::default_api_url")]
    pub api_url: String,
}

impl WebSettings {
    fn default_port() -> u16 {
        5000
    }

    fn default_api_url() -> String {
        "http://127.0.0.1:5001".to_string()
    }

    pub fn server(&self) -> ServerSettings {
        ServerSettings {
            host: self.host.clone(),
            port: self.port,
            request_timeout_ms: self.request_timeout_ms,
            cors: false,
        }
    }
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            api_url: Self::default_api_url(),
        }
    }
}

/// Which key-value store implementation backs the API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "StoreSettings::default_host")]
    pub host: String,
    #[serde(default = "StoreSettings::default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
    /// `COUNT` hint passed to each `SCAN` step.
    #[serde(default = "StoreSettings::default_scan_count")]
    pub scan_count: usize,
}

impl StoreSettings {
    fn default_host() -> String {
        "localhost".to_string()
    }

    fn default_port() -> u16 {
        6379
    }

    fn default_scan_count() -> usize {
        100
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: Self::default_host(),
            port: Self::default_port(),
            password: None,
            scan_count: Self::default_scan_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
