//! kitap-scout - Turkish book price scout
//!
//! Serves the HTTP API or runs searches and uploads from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kitap_scout::commands::{SearchCommand, UploadCommand};
use kitap_scout::config::{Config, OutputFormat};
use kitap_scout::format::Formatter;
use kitap_scout::pricing::normalize_price;
use kitap_scout::server;
use kitap_scout::upload::ProductListing;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kitap-scout",
    version,
    about = "Turkish book price scout",
    long_about = "Finds the cheapest offer for a book across Turkish storefronts, writes listing copy and Excel reports, and stages marketplace uploads."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Directory for generated reports
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Search offers for a book and write a report
    #[command(alias = "s")]
    Search {
        /// Book name
        book_name: String,

        /// Also fetch reviews and predict sales
        #[arg(short, long)]
        advanced: bool,

        /// Maximum number of shopping results
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Normalize price strings (e.g. "₺1.250,00")
    Price {
        #[arg(required = true)]
        prices: Vec<String>,
    },

    /// List known storefronts
    Platforms,

    /// Stage a listing and upload it to the marketplace
    Upload {
        /// Product title
        title: String,

        /// Selling price in TL
        #[arg(short, long)]
        price: f64,

        /// Market (list) price in TL, defaults to the selling price
        #[arg(long)]
        market_price: Option<f64>,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Do not open the seller panel in a browser
        #[arg(long)]
        no_browser: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else if matches!(cli.command, Commands::Serve { .. }) {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // .env is optional
    dotenv::dotenv().ok();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;
    if let Some(dir) = cli.reports_dir {
        config.reports_dir = dir;
    }

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            server::run(&config).await?;
        }

        Commands::Search { book_name, advanced, max } => {
            if let Some(max) = max {
                config.max_results = max;
            }

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&book_name, advanced).await?;
            println!("{}", output);
        }

        Commands::Price { prices } => {
            let formatter = Formatter::new(config.format);
            for raw in &prices {
                println!("{}", formatter.format_price(raw, normalize_price(raw)));
            }
        }

        Commands::Platforms => {
            println!("{}", Formatter::new(config.format).format_platforms());
        }

        Commands::Upload {
            title,
            price,
            market_price,
            description,
            image_url,
            author,
            no_browser,
        } => {
            if no_browser {
                config.open_browser = false;
            }

            let listing =
                ProductListing { title, description, price, market_price, image_url, author };
            let cmd = UploadCommand::new(config);
            let (output, ok) = cmd.execute(&listing).await?;
            println!("{}", output);

            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
