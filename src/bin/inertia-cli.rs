use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use inertia_server::config::{load_config, InertiaConfig};
use inertia_server::page::Page;
use inertia_server::ssr::HttpGateway;

#[derive(Parser)]
#[command(name = "inertia-cli")]
#[command(about = "Management CLI for the Inertia SSR server", long_about = None)]
struct Cli {
    /// Configuration file to read the SSR settings from.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SSR server URL, overriding the configuration.
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in seconds, overriding the configuration.
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the SSR server is up
    CheckSsr,
    /// Ask the SSR server to exit
    StopSsr,
    /// Render a page JSON file and print the result
    Render {
        /// Page descriptor as produced by the server
        page: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => InertiaConfig::default(),
    };
    let mut ssr = config.ssr.clone();
    if let Some(url) = cli.url {
        ssr.url = url;
    }
    if let Some(timeout) = cli.timeout {
        ssr.timeout_secs = timeout;
    }
    let gateway = HttpGateway::new(&ssr, &config.app.base_path)?;

    match cli.command {
        Commands::CheckSsr => {
            if gateway.health().await {
                println!("SSR server at {} is healthy", ssr.url);
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("SSR server at {} is not responding", ssr.url);
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::StopSsr => match gateway.shutdown().await {
            Ok(()) => {
                println!("SSR server at {} stopped", ssr.url);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Render { page } => {
            let content = std::fs::read_to_string(&page)?;
            let page: Page = serde_json::from_str(&content)?;
            match gateway.render(&page).await {
                Ok(rendered) => {
                    println!("{}", rendered.head);
                    println!("{}", rendered.body);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
