pub mod config;
pub mod data;
pub mod join;
pub mod render;
pub mod scale;
pub mod server;
pub mod tooltip;
pub mod topo;
pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the choropleth site (SVG map plus page)
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated site with the hover-query API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            println!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Fetch and join the two datasets
            let counties = data::load_data(&app_config).await?;

            // 2. Derive the color scale from the joined values
            let scale = scale::QuantizeScale::from_counties(&counties);

            // 3. Render the site
            render::write_site(&app_config, &counties, &scale)?;

            println!("Generation complete!");
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // The hover API answers from the same joined data the map was
            // rendered from, so load it again here.
            println!("Loading data for API...");
            let counties = data::load_data(&app_config).await?;

            server::start_server(app_config, counties).await?;
        }
    }

    Ok(())
}
