//! CLI subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::OwnerType;

/// Owner management commands.
#[derive(Debug, Subcommand)]
pub enum OwnerCommand {
    /// Assign or replace the owner of a unit
    Set(SetOwnerArgs),

    /// Remove the owner of a unit
    Remove {
        /// Unit number
        unit: String,
    },

    /// Show the owner of a unit
    Show {
        /// Unit number
        unit: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List all owners in the project
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Arguments for `owner set`.
#[derive(Debug, Args)]
pub struct SetOwnerArgs {
    /// Unit number
    pub unit: String,

    /// Owner's full name
    #[arg(long)]
    pub name: String,

    /// Contact email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Contact phone
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Owner classification
    #[arg(short = 't', long = "type", value_enum, default_value = "buyer")]
    pub owner_type: OwnerTypeArg,

    /// Who is making the assignment
    #[arg(long)]
    pub by: Option<String>,
}

/// Parking management commands.
#[derive(Debug, Subcommand)]
pub enum ParkingCommand {
    /// Replace the parking spots held by a unit (no spots clears them)
    Assign {
        /// Unit number
        unit: String,

        /// Parking spot codes
        spots: Vec<String>,

        /// Refuse spots already held by another unit
        #[arg(long)]
        strict: bool,
    },

    /// Show the parking spots held by a unit
    Show {
        /// Unit number
        unit: String,
    },

    /// Show which unit holds a parking spot
    Lookup {
        /// Parking spot code
        spot: String,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Owner type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OwnerTypeArg {
    /// Buys to occupy (COMPRADOR)
    Buyer,
    /// Buys as an investment (INVERSOR)
    Investor,
    /// Leases the unit (INQUILINO)
    Tenant,
}

impl From<OwnerTypeArg> for OwnerType {
    fn from(arg: OwnerTypeArg) -> Self {
        match arg {
            OwnerTypeArg::Buyer => Self::Buyer,
            OwnerTypeArg::Investor => Self::Investor,
            OwnerTypeArg::Tenant => Self::Tenant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_type_arg_conversion() {
        assert_eq!(OwnerType::from(OwnerTypeArg::Buyer), OwnerType::Buyer);
        assert_eq!(OwnerType::from(OwnerTypeArg::Investor), OwnerType::Investor);
        assert_eq!(OwnerType::from(OwnerTypeArg::Tenant), OwnerType::Tenant);
    }

    #[test]
    fn test_parking_command_debug() {
        let cmd = ParkingCommand::Lookup {
            spot: "a1".to_string(),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Lookup"));
        assert!(debug_str.contains("a1"));
    }
}
