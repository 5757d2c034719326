//! Process configuration from command-line flags and environment variables.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use clap::Parser;

use crate::logging::LogFormat;

/// In-memory heart-rate ledger served over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "heartbeat-ledger-node", version, about)]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "PORT")]
    pub port: u16,

    /// Address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// File read into the environment before flags are parsed.
pub const ENV_FILE: &str = ".env";

/// Load `path` into the process environment without overriding variables
/// that are already set. Returns `Ok(false)` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn port_flag_builds_bind_addr() {
        let c = Config::try_parse_from(["node", "--port", "8080", "--host", "127.0.0.1"]).unwrap();
        assert_eq!(c.bind_addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.log_format, LogFormat::Pretty);
        assert_eq!(c.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Config::try_parse_from(["node", "--port", "http"]).is_err());
        assert!(Config::try_parse_from(["node", "--port", "70000"]).is_err());
    }

    #[test]
    fn json_log_format() {
        let c = Config::try_parse_from(["node", "--port", "1", "--log-format", "json"]).unwrap();
        assert_eq!(c.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(&dir.path().join(ENV_FILE)).unwrap());
    }

    #[test]
    fn env_file_feeds_the_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENV_FILE);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "HEARTBEAT_LEDGER_TEST_PORT=4321").unwrap();

        assert!(load_env_file(&path).unwrap());
        assert_eq!(std::env::var("HEARTBEAT_LEDGER_TEST_PORT").unwrap(), "4321");
    }
}
