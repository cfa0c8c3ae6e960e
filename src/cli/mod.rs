//! Command-line interface for the vehicle service.
//!
//! Provides commands for listing, fetching, saving and deleting vehicles
//! against the configured store, and for running the record and pricing
//! HTTP servers.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::adapters::{HttpPriceClient, MapsClient, PriceClient};
use crate::config::{self, ResolvedConfig};
use crate::core::{MemoryVehicleStore, SqliteVehicleStore, VehicleService, VehicleStore};
use crate::domain::{VehicleId, VehicleInput};
use crate::pricing::PricingService;
use crate::server;

/// vehicles - Vehicle records with live price and address enrichment
#[derive(Parser, Debug)]
#[command(name = "vehicles")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all vehicles
    List,

    /// Show one vehicle
    Get {
        /// Vehicle ID
        id: VehicleId,
    },

    /// Create or update a vehicle from JSON (an "id" field means update)
    Save {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Read input from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Delete a vehicle
    Delete {
        /// Vehicle ID
        id: VehicleId,
    },

    /// Start the vehicle record HTTP server
    Serve {
        /// Address to bind to (default from config)
        #[arg(short, long, env = "VEHICLES_ADDRESS")]
        address: Option<String>,

        /// Keep records in memory instead of the database
        #[arg(long)]
        in_memory: bool,

        /// Price vehicles from an in-process seeded price table
        #[arg(long)]
        local_pricing: bool,
    },

    /// Start the pricing HTTP server
    Pricing {
        /// Address to bind to (default from config)
        #[arg(short, long)]
        address: Option<String>,

        /// Seed prices for vehicle ids 1..=N
        #[arg(long)]
        seed: Option<i64>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        match self.command {
            Commands::List => list_vehicles(config).await,
            Commands::Get { id } => show_vehicle(config, id).await,
            Commands::Save { input, stdin } => save_vehicle(config, input, stdin).await,
            Commands::Delete { id } => delete_vehicle(config, id).await,
            Commands::Serve {
                address,
                in_memory,
                local_pricing,
            } => serve(config, address, in_memory, local_pricing).await,
            Commands::Pricing { address, seed } => serve_pricing(config, address, seed).await,
            Commands::Config => show_config(config),
        }
    }
}

/// Wire a vehicle service from configuration
fn build_service(
    config: &ResolvedConfig,
    in_memory: bool,
    local_pricing: bool,
) -> Result<VehicleService> {
    let store: Arc<dyn VehicleStore> = if in_memory {
        Arc::new(MemoryVehicleStore::new())
    } else {
        Arc::new(SqliteVehicleStore::open(&config.database).with_context(|| {
            format!("Failed to open database: {}", config.database.display())
        })?)
    };

    let prices: Arc<dyn PriceClient> = if local_pricing {
        Arc::new(PricingService::seeded(config.server.pricing_seed))
    } else {
        Arc::new(HttpPriceClient::from_config(config))
    };

    let locations = Arc::new(MapsClient::from_config(config));

    Ok(VehicleService::new(
        store,
        prices,
        locations,
        config.enrichment_settings(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// List all vehicles
async fn list_vehicles(config: &ResolvedConfig) -> Result<()> {
    let service = build_service(config, false, false)?;
    let vehicles = service.list().await?;

    if vehicles.is_empty() {
        eprintln!("No vehicles found");
    }
    print_json(&vehicles)
}

/// Show one vehicle
async fn show_vehicle(config: &ResolvedConfig, id: VehicleId) -> Result<()> {
    let service = build_service(config, false, false)?;
    let vehicle = service.find_by_id(id).await?;
    print_json(&vehicle)
}

/// Create or update a vehicle from JSON input
async fn save_vehicle(
    config: &ResolvedConfig,
    input_file: Option<PathBuf>,
    use_stdin: bool,
) -> Result<()> {
    let raw = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if use_stdin || !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    if raw.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }

    let input: VehicleInput =
        serde_json::from_str(&raw).context("Failed to parse vehicle JSON")?;

    let service = build_service(config, false, false)?;
    let vehicle = service.save(input).await?;

    eprintln!("[Vehicle {} saved]", vehicle.id);
    print_json(&vehicle)
}

/// Delete a vehicle
async fn delete_vehicle(config: &ResolvedConfig, id: VehicleId) -> Result<()> {
    let service = build_service(config, false, false)?;
    service.delete(id).await?;

    eprintln!("[Vehicle {} deleted]", id);
    Ok(())
}

/// Start the record API server
async fn serve(
    config: &ResolvedConfig,
    address: Option<String>,
    in_memory: bool,
    local_pricing: bool,
) -> Result<()> {
    let address = address.unwrap_or_else(|| config.server.address.clone());
    let service = Arc::new(build_service(config, in_memory, local_pricing)?);

    info!(
        %address,
        in_memory,
        local_pricing,
        pricing = %config.pricing.base_url,
        maps = %config.maps.base_url,
        "Starting vehicle API"
    );

    server::serve(server::vehicles_router(service), &address).await
}

/// Start the pricing server
async fn serve_pricing(
    config: &ResolvedConfig,
    address: Option<String>,
    seed: Option<i64>,
) -> Result<()> {
    let address = address.unwrap_or_else(|| config.server.pricing_address.clone());
    let seed = seed.unwrap_or(config.server.pricing_seed);
    let pricing = Arc::new(PricingService::seeded(seed));

    info!(%address, seed, "Starting pricing service");

    server::serve(server::pricing_router(pricing), &address).await
}

/// Print the resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Configuration:");
    match &config.config_file {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: (none, using defaults)"),
    }
    println!("  Home:        {}", config.home.display());
    println!("  Database:    {}", config.database.display());
    println!(
        "  Pricing:     {} (timeout {} ms)",
        config.pricing.base_url, config.pricing.timeout_ms
    );
    println!(
        "  Maps:        {} (timeout {} ms)",
        config.maps.base_url, config.maps.timeout_ms
    );
    println!("  List concurrency:     {}", config.list_concurrency);
    println!("  created_at on update: {:?}", config.created_at_on_update);
    println!("  Server:      {}", config.server.address);
    println!(
        "  Pricing server: {} (seed {})",
        config.server.pricing_address, config.server.pricing_seed
    );
    Ok(())
}
