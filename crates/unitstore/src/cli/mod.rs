//! Command-line interface for unitstore.
//!
//! This module provides the CLI structure for the `unitctl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, OwnerCommand, OwnerTypeArg, ParkingCommand, SetOwnerArgs, StatusCommand,
};

use crate::logging::Verbosity;

/// unitctl - Manage unit owners and parking assignments
///
/// Records which client owns each unit of a development and which parking
/// spots each unit holds, one project at a time.
#[derive(Debug, Parser)]
#[command(name = "unitctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project key (defaults to the configured default project)
    #[arg(short, long, global = true, value_name = "KEY")]
    pub project: Option<String>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage unit owners
    #[command(subcommand)]
    Owner(OwnerCommand),

    /// Manage parking assignments
    #[command(subcommand)]
    Parking(ParkingCommand),

    /// Show assignment counts for the project
    Status(StatusCommand),

    /// List projects with stored assignments
    Projects,

    /// Delete every owner and parking assignment in the project
    Reset {
        /// Confirm deletion; without it nothing is removed
        #[arg(short, long)]
        yes: bool,
    },

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "unitctl");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_owner_set() {
        let cli = Cli::try_parse_from([
            "unitctl", "-p", "apart", "owner", "set", "101", "--name", "Ana García", "--type",
            "investor", "--by", "seller-1",
        ])
        .unwrap();

        assert_eq!(cli.project.as_deref(), Some("apart"));
        match cli.command {
            Command::Owner(OwnerCommand::Set(args)) => {
                assert_eq!(args.unit, "101");
                assert_eq!(args.name, "Ana García");
                assert_eq!(args.owner_type, OwnerTypeArg::Investor);
                assert_eq!(args.email, "");
                assert_eq!(args.by.as_deref(), Some("seller-1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_owner_set_requires_name() {
        assert!(Cli::try_parse_from(["unitctl", "owner", "set", "101"]).is_err());
    }

    #[test]
    fn test_parse_parking_assign_spots() {
        let cli = Cli::try_parse_from(["unitctl", "parking", "assign", "101", "a1", "a2"]).unwrap();
        match cli.command {
            Command::Parking(ParkingCommand::Assign {
                unit,
                spots,
                strict,
            }) => {
                assert_eq!(unit, "101");
                assert_eq!(spots, vec!["a1", "a2"]);
                assert!(!strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_parking_assign_without_spots() {
        let cli = Cli::try_parse_from(["unitctl", "parking", "assign", "101"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Parking(ParkingCommand::Assign { ref spots, .. }) if spots.is_empty()
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["unitctl", "status", "--json", "-vv", "-p", "boulevard"])
            .unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
        assert_eq!(cli.project.as_deref(), Some("boulevard"));
    }

    #[test]
    fn test_parse_quiet() {
        let cli = Cli::try_parse_from(["unitctl", "-q", "projects"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
        assert!(matches!(cli.command, Command::Projects));
    }

    #[test]
    fn test_parse_reset() {
        let cli = Cli::try_parse_from(["unitctl", "-p", "boulevard", "reset", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Reset { yes: true }));

        let cli = Cli::try_parse_from(["unitctl", "reset"]).unwrap();
        assert!(matches!(cli.command, Command::Reset { yes: false }));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["unitctl", "-c", "/custom/config.toml", "config", "path"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
