//! CLI configuration module
//!
//! Manages configuration for the chord node.

use crate::cli::args::CliArgs;
use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the chord node
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on; the node's identity is derived from it
    pub listen_addr: String,
    /// Ring member to join on startup, if any
    pub bootstrap: Option<String>,
    /// Delay between maintenance tasks
    pub cadence: Duration,
    /// Deadline for a single RPC
    pub rpc_deadline: Duration,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Self {
        Self {
            listen_addr: args.listen_addr.clone(),
            bootstrap: args.bootstrap.clone(),
            cadence: Duration::from_millis(args.cadence_ms),
            rpc_deadline: Duration::from_millis(args.rpc_deadline_ms),
            verbose: args.verbose,
            quiet: args.quiet,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate the listen address
        let listen: SocketAddr = self
            .listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", self.listen_addr, e))?;
        if listen.port() == 0 {
            return Err(anyhow::anyhow!("Listen port cannot be 0"));
        }

        // Validate the bootstrap address
        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.is_empty() {
                return Err(anyhow::anyhow!("Bootstrap address cannot be empty"));
            }
            if !bootstrap.contains(':') {
                return Err(anyhow::anyhow!(
                    "Bootstrap address '{}' must be of the form host:port",
                    bootstrap
                ));
            }
            if *bootstrap == self.listen_addr {
                return Err(anyhow::anyhow!("Bootstrap address cannot be the node itself"));
            }
        }

        // Validate timings
        if self.rpc_deadline.is_zero() {
            return Err(anyhow::anyhow!("rpc_deadline_ms must be at least 1"));
        }
        if self.cadence.is_zero() {
            return Err(anyhow::anyhow!("cadence_ms must be at least 1"));
        }

        Ok(())
    }

    /// Check if the node should join an existing ring
    pub fn has_bootstrap(&self) -> bool {
        self.bootstrap.is_some()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            listen_addr: "127.0.0.1:9000".to_string(),
            bootstrap: Some("127.0.0.1:9001".to_string()),
            cadence_ms: 5,
            rpc_deadline_ms: 1000,
            verbose: true,
            quiet: false,
        }
    }

    #[test]
    fn test_config_from_args() {
        let config = Config::from_args(&args());
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.bootstrap.as_deref(), Some("127.0.0.1:9001"));
        assert_eq!(config.cadence, Duration::from_millis(5));
        assert_eq!(config.rpc_deadline, Duration::from_millis(1000));
        assert!(config.has_bootstrap());
        assert!(config.is_verbose());
        assert!(!config.is_quiet());
    }

    #[test]
    fn test_config_validate() {
        let config = Config::from_args(&args());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_invalid_listen_addr() {
        let mut config = Config::from_args(&args());
        config.listen_addr = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_port_zero() {
        let mut config = Config::from_args(&args());
        config.listen_addr = "127.0.0.1:0".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_empty_bootstrap() {
        let mut config = Config::from_args(&args());
        config.bootstrap = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_bootstrap_without_port() {
        let mut config = Config::from_args(&args());
        config.bootstrap = Some("127.0.0.1".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_bootstrap_is_self() {
        let mut config = Config::from_args(&args());
        config.bootstrap = Some(config.listen_addr.clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_zero_deadline() {
        let mut config = Config::from_args(&args());
        config.rpc_deadline = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_zero_cadence() {
        let mut config = Config::from_args(&args());
        config.cadence = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_without_bootstrap() {
        let mut config = Config::from_args(&args());
        config.bootstrap = None;
        assert!(!config.has_bootstrap());
        assert!(config.validate().is_ok());
    }
}
