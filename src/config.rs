use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::protocol::DEFAULT_CHAT_PATH;
use crate::session::DEFAULT_SESSION_TIMEOUT;

/// Config file picked up from the working directory when none is given.
const FALLBACK_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the design backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub chat_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    pub htmx_src: String,
    pub stylesheet: String,
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

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("backend.base_url", "http://127.0.0.1:5000")?
            .set_default("backend.chat_path", DEFAULT_CHAT_PATH)?
            .set_default("session.timeout_secs", DEFAULT_SESSION_TIMEOUT.as_secs())?
            .set_default("session.sweep_interval_secs", 60)?
            .set_default("ui.title", "Thiết kế phòng net")?
            .set_default(
                "ui.htmx_src",
                "https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js",
            )?
            .set_default("ui.stylesheet", "/static/app.css")?;

        // An explicit file must exist; the working-directory fallback may not.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name(FALLBACK_CONFIG_FILE).required(false)),
        };

        // E.g. NETCAFE_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("NETCAFE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their clap env aliases) win over everything else.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
