//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stocktally - inventory analytics for a hosted product table
///
/// Reads a user's products from the hosted table (or a JSON export) and
/// reports total revenue, the top categories and a revenue-ranked table.
///
/// Examples:
///   stocktally report --input productos.json
///   stocktally --user 7 report --category Bebidas --format json
///   stocktally --user 7 add --name Café --category Bebidas --quantity 10 --price 4.5
///   stocktally --user 7 delete --id 12
///   stocktally init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .stocktally.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base URL of the hosted table store
    #[arg(long, value_name = "URL", env = "STOCKTALLY_STORE_URL", global = true)]
    pub store_url: Option<String>,

    /// API key for the hosted table store
    #[arg(long, value_name = "KEY", env = "STOCKTALLY_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// User whose products are read or modified
    #[arg(short, long, value_name = "ID", env = "STOCKTALLY_USER", global = true)]
    pub user: Option<String>,

    /// Store request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the revenue report
    Report(ReportArgs),

    /// List the distinct product categories
    Categories {
        /// Read products from a JSON export instead of the store
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Add a product to the store
    Add(NewProductArgs),

    /// Update fields of an existing product
    Update(UpdateProductArgs),

    /// Delete a product owned by the user
    Delete {
        /// Product identifier
        #[arg(long)]
        id: i64,
    },

    /// Generate a default .stocktally.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Read products from a JSON export instead of the store
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Only show products of this category in the table
    #[arg(long, value_name = "LABEL")]
    pub category: Option<String>,

    /// Number of categories in the chart
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the fetched products to a JSON export
    #[arg(long, value_name = "FILE")]
    pub save_snapshot: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct NewProductArgs {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Category label
    #[arg(long, default_value = "")]
    pub category: String,

    /// Supplier name
    #[arg(long, default_value = "")]
    pub supplier: String,

    /// Units in stock
    #[arg(long)]
    pub quantity: u64,

    /// Price per unit
    #[arg(long)]
    pub price: f64,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Free-form description
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct UpdateProductArgs {
    /// Product identifier
    #[arg(long)]
    pub id: i64,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New category label
    #[arg(long)]
    pub category: Option<String>,

    /// New supplier
    #[arg(long)]
    pub supplier: Option<String>,

    /// New quantity
    #[arg(long)]
    pub quantity: Option<u64>,

    /// New unit price
    #[arg(long)]
    pub price: Option<f64>,

    /// New date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,
}

impl UpdateProductArgs {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.category.is_some()
            || self.supplier.is_some()
            || self.quantity.is_some()
            || self.price.is_some()
            || self.date.is_some()
            || self.description.is_some()
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Price must be a non-negative number".to_string());
    }
    Ok(())
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match &self.command {
            Command::Report(report) => {
                if report.top == Some(0) {
                    return Err("--top must be at least 1".to_string());
                }
                if let Some(ref input) = report.input {
                    if !input.is_file() {
                        return Err(format!("Input file does not exist: {}", input.display()));
                    }
                }
            }
            Command::Categories { input: Some(input) } => {
                if !input.is_file() {
                    return Err(format!("Input file does not exist: {}", input.display()));
                }
            }
            Command::Add(product) => {
                if product.name.trim().is_empty() {
                    return Err("Product name must not be empty".to_string());
                }
                validate_price(product.price)?;
            }
            Command::Update(update) => {
                if !update.has_changes() {
                    return Err("Nothing to update: pass at least one field".to_string());
                }
                if let Some(price) = update.price {
                    validate_price(price)?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Whether the command talks to the hosted store.
    pub fn needs_store(&self) -> bool {
        match &self.command {
            Command::Report(report) => report.input.is_none(),
            Command::Categories { input } => input.is_none(),
            Command::Add(_) | Command::Update(_) | Command::Delete { .. } => true,
            Command::InitConfig => false,
        }
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            config: None,
            verbose: false,
            quiet: false,
            store_url: None,
            api_key: None,
            user: Some("7".to_string()),
            timeout: None,
            command,
        }
    }

    fn report_args() -> ReportArgs {
        ReportArgs {
            input: None,
            category: None,
            top: None,
            format: OutputFormat::Markdown,
            output: None,
            save_snapshot: None,
        }
    }

    fn update_args() -> UpdateProductArgs {
        UpdateProductArgs {
            id: 3,
            name: None,
            category: None,
            supplier: None,
            quantity: None,
            price: None,
            date: None,
            description: None,
        }
    }

    #[test]
    fn test_parse_report_command() {
        let args = Args::try_parse_from([
            "stocktally",
            "--user",
            "7",
            "report",
            "--category",
            "Bebidas",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.user.as_deref(), Some("7"));
        match args.command {
            Command::Report(report) => {
                assert_eq!(report.category.as_deref(), Some("Bebidas"));
                assert_eq!(report.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_command_with_date() {
        let args = Args::try_parse_from([
            "stocktally",
            "add",
            "--name",
            "Café",
            "--quantity",
            "10",
            "--price",
            "4.5",
            "--date",
            "2024-02-29",
        ])
        .unwrap();

        match args.command {
            Command::Add(product) => {
                assert_eq!(product.quantity, 10);
                assert_eq!(product.date, NaiveDate::from_ymd_opt(2024, 2, 29));
                assert_eq!(product.category, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::InitConfig);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut report = report_args();
        report.top = Some(0);
        assert!(make_args(Command::Report(report)).validate().is_err());
    }

    #[test]
    fn test_validation_empty_update() {
        assert!(make_args(Command::Update(update_args())).validate().is_err());

        let mut update = update_args();
        update.quantity = Some(4);
        assert!(make_args(Command::Update(update)).validate().is_ok());
    }

    #[test]
    fn test_validation_negative_price() {
        let mut update = update_args();
        update.price = Some(-1.0);
        assert!(make_args(Command::Update(update)).validate().is_err());
    }

    #[test]
    fn test_needs_store() {
        assert!(make_args(Command::Report(report_args())).needs_store());
        assert!(make_args(Command::Delete { id: 1 }).needs_store());
        assert!(!make_args(Command::InitConfig).needs_store());

        let mut report = report_args();
        report.input = Some(PathBuf::from("productos.json"));
        assert!(!make_args(Command::Report(report)).needs_store());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::InitConfig);
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args(Command::InitConfig);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
