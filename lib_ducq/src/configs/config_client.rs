use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::event_buffer::DEFAULT_CAPACITY;
use crate::error::{DucqError, Result};
use crate::session::endpoint::{Endpoint, Greeting, DEFAULT_COMMAND, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_ROUTE};

const CONFIG_FILE_NAME: &str = "ducq.conf";
const CONFIG_APP_DIR: &str = "ducq";

/// Every client option, each one optional so layers can be merged.
#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[command(about = "ducq bus client", version)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigArgs {
    #[arg(long, env = "DUCQ_HOST", help = "Host name of the bus.")]
    pub host: Option<String>,

    #[arg(long, env = "DUCQ_PORT", help = "Port of the bus.")]
    pub port: Option<u16>,

    #[arg(long, env = "DUCQ_COMMAND", help = "Command sent in the greeting.")]
    pub command: Option<String>,

    #[arg(long, env = "DUCQ_ROUTE", help = "Route sent in the greeting.")]
    pub route: Option<String>,

    #[arg(long, env = "DUCQ_PAYLOAD", help = "Payload sent in the greeting.")]
    pub payload: Option<String>,

    #[arg(long, env = "DUCQ_MAX_MESSAGES", help = "Number of frames kept per panel.")]
    pub max_messages: Option<usize>,

    #[arg(long, env = "DUCQ_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[arg(long, env = "DUCQ_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, env = "DUCQ_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    /// Built-in defaults, the bottom layer.
    pub fn defaults() -> Self {
        Self {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            command: Some(DEFAULT_COMMAND.to_string()),
            route: Some(DEFAULT_ROUTE.to_string()),
            payload: Some(String::new()),
            max_messages: Some(DEFAULT_CAPACITY),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            ..Default::default()
        }
    }

    // 'other' overrides 'self' for Some values
    pub fn merge(self, other: ConfigArgs) -> ConfigArgs {
        ConfigArgs {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            command: other.command.or(self.command),
            route: other.route.or(self.route),
            payload: other.payload.or(self.payload),
            max_messages: other.max_messages.or(self.max_messages),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
        }
    }
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub greeting: Greeting,
    pub max_messages: usize,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl ClientConfig {
    /// Fills the gaps of `args` with defaults and validates the result.
    pub fn from_args(args: ConfigArgs) -> Result<Self> {
        let args = ConfigArgs::defaults().merge(args);

        let max_messages = args.max_messages.unwrap_or(DEFAULT_CAPACITY);
        if max_messages == 0 {
            return Err(DucqError::Config("maxMessages must be at least 1".to_string()));
        }

        let endpoint = Endpoint::new(args.host.unwrap_or_else(|| DEFAULT_HOST.to_string()), args.port.unwrap_or(DEFAULT_PORT));
        endpoint.address()?;

        Ok(Self {
            endpoint,
            greeting: Greeting::new(
                args.command.unwrap_or_else(|| DEFAULT_COMMAND.to_string()),
                args.route.unwrap_or_else(|| DEFAULT_ROUTE.to_string()),
                args.payload.unwrap_or_default(),
            ),
            max_messages,
            log_dir: args.log_dir.unwrap_or_default(),
            log_level: args.log_level.unwrap_or_default(),
        })
    }
}

/// Resolves `cli` on top of the config file and the built-in defaults.
pub fn load_config_from(cli: ConfigArgs) -> Result<ClientConfig> {
    let mut current = ConfigArgs::defaults();

    match config_file_path(cli.config_path.as_deref()) {
        Some(path) => {
            if let Some(file_config) = read_config_file(&path)? {
                current = current.merge(file_config);
            }
        }
        None => log::info!("No config file found. Using defaults and environment/CLI variables."),
    }

    ClientConfig::from_args(current.merge(cli))
}

/// `explicit`, else `./ducq.conf`, else `<config_dir>/ducq/ducq.conf`.
fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_APP_DIR).join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

fn read_config_file(path: &Path) -> Result<Option<ConfigArgs>> {
    if !path.exists() {
        log::info!("Config file not found at {}. Using defaults and environment/CLI variables.", path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<ConfigArgs>(&content)
        .map_err(|e| DucqError::Config(format!("{}: {}", path.display(), e)))?;
    log::info!("Loaded config file {}", path.display());
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_args(ConfigArgs::default()).unwrap();
        assert_eq!(config.endpoint, Endpoint::new("localhost", 8080));
        assert_eq!(config.greeting.to_frame(), "subscribe *\n");
        assert_eq!(config.max_messages, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_merge_prefers_some_values() {
        let base = ConfigArgs {
            host: Some("a".into()),
            port: Some(1),
            ..Default::default()
        };
        let over = ConfigArgs {
            port: Some(2),
            ..Default::default()
        };
        let merged = base.merge(over);
        assert_eq!(merged.host.as_deref(), Some("a"));
        assert_eq!(merged.port, Some(2));
    }

    #[test]
    fn test_cli_flags_parse() {
        let args = ConfigArgs::try_parse_from(["ducq", "--port", "9001", "--route", "__MONITOR__", "--max-messages", "3"])
            .unwrap();
        assert_eq!(args.port, Some(9001));
        assert_eq!(args.route.as_deref(), Some("__MONITOR__"));
        assert_eq!(args.max_messages, Some(3));
    }

    #[test]
    fn test_file_layer_under_cli_layer() {
        let file = write_config(r#"{ "host": "bus.local", "port": 9100, "maxMessages": 25, "payload": "x" }"#);
        let cli = ConfigArgs {
            port: Some(9200),
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = load_config_from(cli).unwrap();
        assert_eq!(config.endpoint, Endpoint::new("bus.local", 9200));
        assert_eq!(config.max_messages, 25);
        assert_eq!(config.greeting.payload, "x");
    }

    #[test]
    fn test_missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cli = ConfigArgs {
            config_path: Some(dir.path().join("absent.conf")),
            ..Default::default()
        };
        let config = load_config_from(cli).unwrap();
        assert_eq!(config.endpoint, Endpoint::default());
    }

    #[test]
    fn test_broken_file_is_a_config_error() {
        let file = write_config("{ not json");
        let cli = ConfigArgs {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(load_config_from(cli), Err(DucqError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let args = ConfigArgs {
            max_messages: Some(0),
            ..Default::default()
        };
        assert!(matches!(ClientConfig::from_args(args), Err(DucqError::Config(_))));
    }

    #[test]
    fn test_bad_host_rejected() {
        let args = ConfigArgs {
            host: Some("bad host".into()),
            ..Default::default()
        };
        assert!(matches!(ClientConfig::from_args(args), Err(DucqError::InvalidAddress { .. })));
    }
}
