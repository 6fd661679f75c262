use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use menulens_config::Config;
use menulens_gateway::{GatewayState, start_server};
use menulens_pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "menulens")]
#[command(about = "MenuLens — see a restaurant menu come alive")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MenuLens HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Extract dish records from a menu photo and print them as JSON
    Extract {
        /// Path to the menu image
        image: PathBuf,
    },
    /// Run the full cycle on a menu photo: upload, extract, generate
    Visualize {
        /// Path to the menu image
        image: PathBuf,
    },
    /// Check whether a local server is running
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let addr: SocketAddr =
                format!("{}:{}", config.bind_address, port.unwrap_or(config.port))
                    .parse()
                    .context("invalid bind address")?;
            info!(%addr, "starting menulens");
            let state = GatewayState {
                pipeline: Arc::new(Pipeline::from_config(&config)),
            };
            start_server(addr, state).await?;
        }
        Commands::Extract { image } => {
            let bytes = read_image(&image)?;
            let pipeline = Pipeline::from_config(&config);
            let result = pipeline.extract(&bytes).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Visualize { image } => {
            let bytes = read_image(&image)?;
            let filename = image
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("menu.jpg")
                .to_string();
            let pipeline = Pipeline::from_config(&config);
            let report = pipeline.run(&bytes, &filename).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("menulens is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

fn read_image(path: &PathBuf) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("could not read {}", path.display()))
}
