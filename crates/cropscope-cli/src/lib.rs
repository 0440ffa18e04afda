//! Shared CLI definitions for cropscope.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// View written to stdout by `--print`
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PrintView {
    /// Key findings over the whole dataset (markdown)
    Overview,
    /// Detailed report for one crop (use with --crop)
    Crop,
    /// Average yield per crop within one season (use with --season)
    Season,
    /// Average price per crop and the price statistics table
    Prices,
}

impl PrintView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Crop => "crop",
            Self::Season => "season",
            Self::Prices => "prices",
        }
    }
}

/// Command-line arguments for cropscope
#[derive(Clone, Parser, Debug)]
#[command(
    name = "cropscope",
    version,
    about = "Crop yield, season and price exploration in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the crop season data file (CSV). Defaults to [data] path in the config, then data_season.csv
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Specify the delimiter to use when reading the data file (default: ',')
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Print a single view to stdout and exit instead of opening the dashboard
    #[arg(long = "print", value_enum, value_name = "VIEW")]
    pub print: Option<PrintView>,

    /// Crop to report on with --print crop ("All Crops" selects every crop)
    #[arg(long = "crop", value_name = "CROP")]
    pub crop: Option<String>,

    /// Season to chart with --print season (required for that view)
    #[arg(long = "season", value_name = "SEASON")]
    pub season: Option<String>,

    /// Write the printed view as JSON instead of text
    #[arg(long = "json", requires = "print", action)]
    pub json: bool,

    /// Also render the printed view's chart to this PNG file
    #[arg(long = "export-chart", requires = "print", value_name = "FILE")]
    pub export_chart: Option<PathBuf>,

    /// Enable debug logging (log file in the cache directory, or stderr with --print)
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/cropscope/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let placeholder: String = arg
            .get_value_names()
            .map(|names| {
                names
                    .iter()
                    .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let option_str = if arg.is_positional() {
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            if !arg.get_action().takes_values() || placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_print_crop() {
        let args = Args::try_parse_from([
            "cropscope",
            "data.csv",
            "--print",
            "crop",
            "--crop",
            "Rice",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("data.csv")));
        assert_eq!(args.print, Some(PrintView::Crop));
        assert_eq!(args.crop.as_deref(), Some("Rice"));
        assert!(args.json);
    }

    #[test]
    fn test_json_requires_print() {
        assert!(Args::try_parse_from(["cropscope", "--json"]).is_err());
        assert!(Args::try_parse_from(["cropscope", "--export-chart", "out.png"]).is_err());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["cropscope", "--force"]).is_err());
        let args = Args::try_parse_from(["cropscope", "--generate-config", "--force"]).unwrap();
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn test_delimiter_is_a_char() {
        let args = Args::try_parse_from(["cropscope", "--delimiter", ";"]).unwrap();
        assert_eq!(args.delimiter, Some(';'));
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("`--print <VIEW>`"));
        assert!(md.contains("`[<PATH>]`"));
        assert!(!md.contains("--help"));
    }
}
