use std::path::Path;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

/// Default location of the catalog / SQL-agent service.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Views untouched for this long are dropped (30 minutes).
const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 30 * 60;

/// Default htmx script location.
pub const DEFAULT_HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the catalog / SQL-agent service
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub views: ViewsConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewsConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

impl ViewsConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Sweep period, never shorter than one second.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub htmx_src: String,
    /// Show an inline notice when a dashboard write fails (otherwise log only).
    pub show_dashboard_errors: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Priority: CLI flag / CLI env var > `APP_` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("backend.base_url", DEFAULT_BACKEND_URL)?
            .set_default("views.idle_timeout_secs", DEFAULT_IDLE_TIMEOUT_SECS)?
            .set_default("views.sweep_interval_secs", 60)?
            .set_default("ui.htmx_src", DEFAULT_HTMX_SRC)?
            .set_default("ui.show_dashboard_errors", false)?
            .set_default("log.format", "compact")?;

        // 2. Config file: explicit path, else ./config.yaml when present
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config.yaml").required(false));
        }

        // 3. Environment, e.g. APP_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI overrides (clap already folded PORT / BACKEND_URL in)
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = &cli.backend_url {
            builder = builder.set_override("backend.base_url", url.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Socket address string for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
