use std::path::PathBuf;

use clap::{Parser, Subcommand};
use genrepie::{
    analyzer::Analyzer,
    clients::{SpotifyClient, errors::Result},
    config::ConfigBuilder,
    web,
};
use log::info;

#[derive(Parser)]
#[command(name = "genrepie")]
#[command(version, about = "Chart the most common genres of a Spotify playlist", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web app
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:5000
        #[arg(long)]
        address: Option<String>,
        /// Directory generated charts are written to and served from
        #[arg(long)]
        image_dir: Option<PathBuf>,
        /// Where session tokens are kept: "duckdb" or "memory"
        #[arg(long)]
        token_store: Option<String>,
    },
    /// Analyze one playlist from the terminal
    Analyze {
        /// Playlist name, matched without regard to case
        playlist: String,
        /// Directory the chart is written to
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            address,
            image_dir,
            token_store,
        } => {
            let mut builder = ConfigBuilder::new();
            if let Some(address) = address {
                builder = builder.address(address);
            }
            if let Some(dir) = image_dir {
                builder = builder.image_dir(dir);
            }
            if let Some(kind) = token_store {
                builder = builder.token_store(kind);
            }
            web::serve(builder.with_env().build()?).await
        }
        Commands::Analyze {
            playlist,
            image_dir,
        } => analyze_playlist(&playlist, image_dir).await,
    }
}

async fn analyze_playlist(playlist: &str, image_dir: Option<PathBuf>) -> Result<()> {
    info!("Building config ...");
    let mut builder = ConfigBuilder::new();
    if let Some(dir) = image_dir {
        builder = builder.image_dir(dir);
    }
    let config = builder.with_env().build_analyzer();

    let spotify = SpotifyClient::try_default()?;
    info!("Authorizing client ...");
    // CLI prompt may be shown here
    spotify.authorize_client().await?;

    let analysis = Analyzer::new(&spotify, &config)
        .analyze(playlist)
        .await?;

    println!("Top genres in {}", analysis.playlist_name);
    if analysis.top.is_empty() {
        println!("  no genres found");
    }
    for (rank, entry) in analysis.top.iter().enumerate() {
        println!("{:>3}. {:<32} {}", rank + 1, entry.genre, entry.count);
    }
    println!(
        "Chart saved to {}",
        config.image_dir.join(&analysis.image_file).display()
    );
    Ok(())
}
