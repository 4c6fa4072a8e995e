//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stagehand - install orchestration and session tracking
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install orchestration and session tracking")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the state directory
    #[arg(long, global = true, value_name = "PATH", env = "STAGEHAND_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Add a retrieved artifact to the pending queue
    #[command(alias = "q")]
    Queue {
        /// Package identity (reverse-DNS form)
        package: String,

        /// Version code of the artifact
        #[arg(long, default_value_t = 1)]
        version: i64,

        /// Human-readable display name (defaults to the package id)
        #[arg(long)]
        name: Option<String>,

        /// Artifact size in bytes
        #[arg(long, default_value_t = 0)]
        size: u64,

        /// Declared target SDK level
        #[arg(long, default_value_t = 31)]
        target_sdk: i32,

        /// Dependent shared library, as `package=version` (repeatable)
        #[arg(long, value_name = "PKG=VERSION")]
        lib: Vec<String>,
    },

    /// Mark a retrieved artifact as awaiting install
    Enqueue {
        /// Package identity
        package: String,
    },

    /// Run the orchestration loop until the queue settles
    Run {
        /// Give up after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// Show the pending queue
    #[command(alias = "ls")]
    Status,

    /// List the install backends available right now
    Backends,

    /// Set the preferred install backend
    #[command(name = "set-backend")]
    SetBackend {
        /// Backend name (session, native, root, service, helper, broker)
        backend: String,
    },

    /// Request removal of an installed package
    #[command(alias = "rm")]
    Uninstall {
        /// Package identity
        package: String,
    },

    /// Remove a single record from the queue
    Remove {
        /// Package identity
        package: String,
    },

    /// Clear the entire pending queue
    Reset,
}

impl Commands {
    /// Get command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Queue { .. } => "queue",
            Commands::Enqueue { .. } => "enqueue",
            Commands::Run { .. } => "run",
            Commands::Status => "status",
            Commands::Backends => "backends",
            Commands::SetBackend { .. } => "set-backend",
            Commands::Uninstall { .. } => "uninstall",
            Commands::Remove { .. } => "remove",
            Commands::Reset => "reset",
        }
    }

    /// Validate command arguments
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Commands::Queue { package, lib, .. } => {
                if package.is_empty() {
                    return Err("Package identity cannot be empty".to_string());
                }
                for spec in lib {
                    if parse_lib_spec(spec).is_none() {
                        return Err(format!(
                            "Invalid shared-lib spec '{spec}': expected package=version"
                        ));
                    }
                }
                Ok(())
            }
            Commands::Enqueue { package }
            | Commands::Uninstall { package }
            | Commands::Remove { package }
                if package.is_empty() =>
            {
                Err("Package identity cannot be empty".to_string())
            }
            Commands::SetBackend { backend } => {
                if stagehand_types::BackendKind::parse(backend).is_none() {
                    return Err(format!(
                        "Unknown backend '{backend}': expected one of session, native, root, service, helper, broker"
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Parse a `package=version` shared-lib argument.
pub fn parse_lib_spec(spec: &str) -> Option<(String, i64)> {
    let (package, version) = spec.split_once('=')?;
    if package.is_empty() {
        return None;
    }
    let version = version.parse().ok()?;
    Some((package.to_string(), version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["stagehand", "queue", "com.example.app"]);
        assert!(matches!(cli.command, Commands::Queue { .. }));

        let cli = Cli::parse_from([
            "stagehand",
            "queue",
            "com.example.app",
            "--version",
            "42",
            "--lib",
            "com.example.lib=3",
        ]);
        if let Commands::Queue { version, lib, .. } = cli.command {
            assert_eq!(version, 42);
            assert_eq!(lib, vec!["com.example.lib=3"]);
        } else {
            panic!("Expected Queue command");
        }

        let cli = Cli::parse_from(["stagehand", "--debug", "status"]);
        assert!(cli.global.debug);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_command_aliases() {
        let cli = Cli::parse_from(["stagehand", "q", "com.example.app"]);
        assert!(matches!(cli.command, Commands::Queue { .. }));

        let cli = Cli::parse_from(["stagehand", "ls"]);
        assert!(matches!(cli.command, Commands::Status));

        let cli = Cli::parse_from(["stagehand", "rm", "com.example.app"]);
        assert!(matches!(cli.command, Commands::Uninstall { .. }));
    }

    #[test]
    fn test_command_validation() {
        let queue_bad_lib = Commands::Queue {
            package: "com.example.app".to_string(),
            version: 1,
            name: None,
            size: 0,
            target_sdk: 31,
            lib: vec!["nonsense".to_string()],
        };
        assert!(queue_bad_lib.validate().is_err());

        let set_unknown = Commands::SetBackend {
            backend: "telepathy".to_string(),
        };
        assert!(set_unknown.validate().is_err());

        let set_known = Commands::SetBackend {
            backend: "broker".to_string(),
        };
        assert!(set_known.validate().is_ok());
    }

    #[test]
    fn test_lib_spec_parsing() {
        assert_eq!(
            parse_lib_spec("com.example.lib=3"),
            Some(("com.example.lib".to_string(), 3))
        );
        assert_eq!(parse_lib_spec("=3"), None);
        assert_eq!(parse_lib_spec("com.example.lib"), None);
        assert_eq!(parse_lib_spec("com.example.lib=x"), None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Commands::Status.name(), "status");
        assert_eq!(Commands::Reset.name(), "reset");
        assert_eq!(
            Commands::SetBackend {
                backend: "root".to_string()
            }
            .name(),
            "set-backend"
        );
    }
}
