//! Stocktally - inventory analytics for a hosted product table
//!
//! A CLI that reads a user's products from the hosted table (or a JSON
//! export), reports revenue by category and by product, and performs
//! simple add/update/delete operations on the table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, store request, file I/O, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use chrono::Local;
use cli::{Args, Command, NewProductArgs, OutputFormat, ReportArgs, UpdateProductArgs};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::ProductRecord;
use report::ReportOptions;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use store::{InventoryStore, ProductPatch, ProductRow};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Config comes first so `[general] verbose` can raise the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Stocktally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .stocktally.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Fill in [store] url, api_key and user to read from the hosted table.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not set up logging: {}", e);
    }
}

/// Dispatch the parsed command.
async fn run(args: Args, config: Config) -> Result<()> {
    let store = if args.needs_store() {
        Some(InventoryStore::new(&config.store).context("Cannot connect to the product store")?)
    } else {
        None
    };

    match (&args.command, store) {
        (Command::Report(report_args), store) => {
            handle_report(report_args, store.as_ref(), &config, args.quiet).await
        }
        (Command::Categories { input }, store) => {
            let records = load_records(input.as_deref(), store.as_ref(), args.quiet).await?;
            for category in analysis::distinct_categories(&records) {
                println!("{}", category);
            }
            Ok(())
        }
        (Command::Add(product), Some(store)) => handle_add(product, &store, &config, args.quiet).await,
        (Command::Update(update), Some(store)) => handle_update(update, &store).await,
        (Command::Delete { id }, Some(store)) => {
            let removed = store.delete_product(*id).await?;
            println!("🗑️  Deleted product {} ({})", id, removed.name);
            Ok(())
        }
        (Command::InitConfig, _) => unreachable!("init-config is handled before dispatch"),
        (command, None) => anyhow::bail!("{:?} requires the product store", command),
    }
}

/// Where the configuration came from, logged once the subscriber is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Fallback(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(e))),
    }
}

/// Run `fut` behind a spinner unless quiet.
async fn with_spinner<T>(message: &str, quiet: bool, fut: impl Future<Output = T>) -> T {
    if quiet {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = fut.await;
    spinner.finish_and_clear();
    result
}

/// Read the product snapshot from a file or from the store.
async fn load_records(
    input: Option<&Path>,
    store: Option<&InventoryStore>,
    quiet: bool,
) -> Result<Vec<ProductRecord>> {
    match (input, store) {
        (Some(path), _) => store::load_snapshot(path).await,
        (None, Some(store)) => {
            let message = format!("Fetching products for user {}...", store.user());
            Ok(with_spinner(&message, quiet, store.fetch_products()).await?)
        }
        (None, None) => anyhow::bail!("No product source: pass --input or configure the store"),
    }
}

fn describe_source(input: Option<&Path>, store: Option<&InventoryStore>) -> String {
    match (input, store) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(store)) => format!("store (user {})", store.user()),
        (None, None) => "unknown".to_string(),
    }
}

/// Pick the output path: explicit flag, else the configured default with
/// the extension matching the format.
fn output_path(args: &ReportArgs, config: &Config) -> PathBuf {
    if let Some(ref output) = args.output {
        return output.clone();
    }

    let default = PathBuf::from(&config.general.output);
    match args.format {
        OutputFormat::Json => default.with_extension("json"),
        OutputFormat::Markdown => default,
    }
}

async fn handle_report(
    args: &ReportArgs,
    store: Option<&InventoryStore>,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let input = args.input.as_deref();
    let records = load_records(input, store, quiet).await?;

    if let Some(ref snapshot) = args.save_snapshot {
        store::save_snapshot(snapshot, &records)?;
        info!("Saved snapshot to {}", snapshot.display());
    }

    let mut options = ReportOptions::from_config(&config.report, describe_source(input, store));
    options.category = args.category.clone();
    if let Some(top) = args.top {
        options.top_categories = top;
    }

    let report = report::build_report(&records, &options);

    if let Some(ref category) = args.category {
        if !report.categories.contains(category) {
            warn!("Category '{}' does not appear in the snapshot", category);
        }
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(
            &report,
            &config.report.currency_symbol,
            config.report.bar_width,
            config.report.include_categories,
        ),
    };

    let path = output_path(args, config);
    std::fs::write(&path, &output)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    // Print summary
    println!("\n📊 Inventory Summary:");
    println!("   Products: {}", report.metadata.record_count);
    println!("   Total revenue: {}", report.total_revenue_display);
    for category in &report.top_categories {
        println!(
            "   - {}: {}",
            category.label,
            report::format_currency(category.total, &config.report.currency_symbol)
        );
    }
    if report.rows.iter().all(|row| row.is_placeholder()) {
        println!("   (no products to list)");
    }
    println!("\n✅ Report saved to: {}", path.display());

    Ok(())
}

async fn handle_add(
    product: &NewProductArgs,
    store: &InventoryStore,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let id = store.next_product_id().await?;
    let date = product.date.unwrap_or_else(|| Local::now().date_naive());

    let row = ProductRow {
        id_producto: id,
        nombre: product.name.trim().to_string(),
        categoria: product.category.trim().to_string(),
        proveedor: product.supplier.trim().to_string(),
        cantidad: product.quantity,
        precio_unitario: product.price,
        fecha: date.format("%Y-%m-%d").to_string(),
        descripcion: product.description.clone(),
        id_usuario: store::rows::owner_value(store.user()),
    };

    let stored = store.insert_product(&row).await?;
    println!(
        "✅ Added product {} ({}) worth {}",
        id,
        stored.name,
        report::format_currency(stored.line_revenue(), &config.report.currency_symbol)
    );

    // Refresh so the user sees the new standing
    let records = with_spinner("Refreshing products...", quiet, store.fetch_products()).await?;
    println!(
        "   Products: {} | Total revenue: {}",
        records.len(),
        report::format_currency(
            analysis::compute_total_revenue(&records),
            &config.report.currency_symbol
        )
    );

    Ok(())
}

async fn handle_update(update: &UpdateProductArgs, store: &InventoryStore) -> Result<()> {
    let patch = ProductPatch {
        nombre: update.name.clone(),
        categoria: update.category.clone(),
        proveedor: update.supplier.clone(),
        cantidad: update.quantity,
        precio_unitario: update.price,
        fecha: update.date.map(|d| d.format("%Y-%m-%d").to_string()),
        descripcion: update.description.clone(),
    };

    if patch.is_empty() {
        anyhow::bail!("Nothing to update for product {}", update.id);
    }

    let updated = store.update_product(update.id, &patch).await?;
    println!("✅ Updated product {} ({})", update.id, updated.name);
    Ok(())
}
