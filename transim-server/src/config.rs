use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use transim_core::prelude::{EngineConfig, NetworkConfig};

/// Transit simulation server
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// JSON network snapshot (stops, routes, vehicles)
    #[arg(short, long)]
    pub network: Option<PathBuf>,

    /// Begin moving vehicles right away instead of waiting for a resume
    #[arg(long)]
    pub resume: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            request_timeout_secs: 10,
            concurrency_limit: 256,
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub simulation: EngineConfig,
    pub network: NetworkConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ServerConfig {
    /// Reads a TOML configuration file. Missing sections and keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Configuration file (if any) with command line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(bind) = args.bind {
            config.server.bind = bind;
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(network) = &args.network {
            config.network.path = Some(network.clone());
        }
        if args.resume {
            config.simulation.start_paused = false;
        }
        Ok(config)
    }
}

impl std::str::FromStr for ServerConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config: ServerConfig = "".parse().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.simulation, EngineConfig::default());
        assert!(config.network.path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ServerConfig = r#"
            [server]
            port = 9000

            [simulation]
            tick_interval_ms = 50
            start_paused = false

            [network]
            path = "city.json"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.simulation.tick_interval_ms, 50);
        assert_eq!(config.simulation.delta_time, 0.1);
        assert!(!config.simulation.start_paused);
        assert_eq!(config.network.path, Some(PathBuf::from("city.json")));
    }

    #[test]
    fn command_line_overrides_file() {
        let args = Args::parse_from(["transim-server", "--port", "3000", "--resume"]);
        let config = ServerConfig::from_args(&args).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(!config.simulation.start_paused);
    }

    #[test]
    fn unreadable_file_is_reported() {
        let args = Args::parse_from(["transim-server", "--config", "/no/such/transim.toml"]);
        assert!(matches!(
            ServerConfig::from_args(&args),
            Err(ConfigError::Read { .. })
        ));
    }
}
