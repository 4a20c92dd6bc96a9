//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::Parser;

/// CLI arguments for the chord node
#[derive(Debug, Parser)]
#[command(name = "rust-chord-node")]
#[command(about = "A Chord distributed hash table node", long_about = None)]
pub struct CliArgs {
    /// Address to listen on (host:port); also determines the node's ring identifier
    #[arg(value_name = "LISTEN_ADDR")]
    pub listen_addr: String,

    /// Address of an existing ring member to join on startup
    #[arg(short, long, value_name = "ADDR")]
    pub bootstrap: Option<String>,

    /// Delay between maintenance tasks in milliseconds
    #[arg(long, default_value_t = 5)]
    pub cadence_ms: u64,

    /// Deadline for a single RPC in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub rpc_deadline_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            listen_addr: "127.0.0.1:9000".to_string(),
            bootstrap: None,
            cadence_ms: 5,
            rpc_deadline_ms: 1000,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_default_values() {
        let args = args();
        assert_eq!(args.cadence_ms, 5);
        assert_eq!(args.rpc_deadline_ms, 1000);
        assert!(args.bootstrap.is_none());
        assert!(!args.is_verbose());
        assert!(!args.is_quiet());
    }

    #[test]
    fn test_log_level() {
        let mut a = args();
        assert_eq!(a.log_level(), tracing::Level::INFO);
        a.verbose = true;
        assert_eq!(a.log_level(), tracing::Level::DEBUG);
        a.verbose = false;
        a.quiet = true;
        assert_eq!(a.log_level(), tracing::Level::ERROR);
    }
}
