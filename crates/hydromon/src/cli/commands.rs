//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::entry::PlantType;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Plant to list entries for
    #[arg(value_enum)]
    pub plant: PlantTypeArg,

    /// Only include entries on or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only include entries on or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Plant the observation belongs to
    #[arg(value_enum)]
    pub plant: PlantTypeArg,

    /// Observation date (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, value_name = "DATE")]
    pub date: String,

    /// Electrical conductivity reading, in μS/cm
    #[arg(long)]
    pub ec: f64,

    /// pH reading (0-14)
    #[arg(long)]
    pub ph: f64,

    /// Free-text notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Attach a photo from a file (jpeg, png, or gif)
    #[arg(long, value_name = "FILE", conflicts_with = "photo_data")]
    pub photo: Option<PathBuf>,

    /// Attach a photo from a base64 data URL
    #[arg(long, value_name = "DATA_URL")]
    pub photo_data: Option<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the entry to delete
    pub id: i64,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Plant to compute statistics for
    #[arg(value_enum)]
    pub plant: PlantTypeArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Plant to export entries for
    #[arg(value_enum)]
    pub plant: PlantTypeArg,

    /// Write the CSV here instead of the suggested filename
    /// (use `-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
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

/// Plant type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlantTypeArg {
    /// Water spinach (kangkong)
    WaterSpinach,
    /// Common sage
    Sage,
    /// Chili pepper
    Chili,
}

impl From<PlantTypeArg> for PlantType {
    fn from(arg: PlantTypeArg) -> Self {
        match arg {
            PlantTypeArg::WaterSpinach => Self::WaterSpinach,
            PlantTypeArg::Sage => Self::Sage,
            PlantTypeArg::Chili => Self::Chili,
        }
    }
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_type_arg_conversion() {
        assert_eq!(
            PlantType::from(PlantTypeArg::WaterSpinach),
            PlantType::WaterSpinach
        );
        assert_eq!(PlantType::from(PlantTypeArg::Sage), PlantType::Sage);
        assert_eq!(PlantType::from(PlantTypeArg::Chili), PlantType::Chili);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_plant_type_arg_value_names_are_kebab_case() {
        // clap derives kebab-case value names; they must match the
        // canonical PlantType spelling.
        let value = PlantTypeArg::WaterSpinach
            .to_possible_value()
            .expect("variant is not skipped");
        assert_eq!(value.get_name(), PlantType::WaterSpinach.as_str());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        assert!(format!("{cmd:?}").contains("Show"));
    }
}
