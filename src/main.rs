use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use docstack::archive::PackJob;
use docstack::concat::ConcatJob;
use docstack::config::{AppState, DEFAULT_PORT, ServeConfig};
use docstack::errors::DocError;
use docstack::handlers;
use docstack::logger::Logger;

#[derive(Parser)]
#[command(name = "docstack", about = "Local documentation toolchain", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve a documentation tree over HTTP for local preview
    Serve {
        /// Directory to serve
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,
    },
    /// Combine per-language markdown trees into single documents
    Concat {
        /// Repository root holding the language directories
        #[arg(long, default_value = ".")]
        base: PathBuf,
        /// Output directory, relative to the base
        #[arg(long, default_value = "docs")]
        out: PathBuf,
        /// Language directories to combine
        #[arg(long = "lang", default_values_t = [String::from("en"), String::from("es")])]
        langs: Vec<String>,
    },
    /// Package the tree into a timestamped release archive
    Pack {
        #[arg(long, default_value = ".")]
        base: PathBuf,
        /// Archive name prefix
        #[arg(long, default_value = "docstack")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), DocError> {
    let _ = Logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        dir: PathBuf::from("."),
        port: DEFAULT_PORT,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
    }) {
        Command::Serve { dir, port, host } => serve(dir, host, port).await,
        Command::Concat { base, out, langs } => {
            let job = ConcatJob {
                out_dir: base.join(out),
                base_dir: base,
                langs,
            };
            for path in job.run()? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Pack { base, name } => {
            let job = PackJob { base_dir: base, name };
            println!("{}", job.run()?.display());
            Ok(())
        }
    }
}

async fn serve(dir: PathBuf, host: IpAddr, port: u16) -> Result<(), DocError> {
    // Resolver confinement needs an absolute root; this also verifies the
    // directory exists before binding.
    let root = dir.canonicalize()?;
    let config = ServeConfig::new(root, host, port);
    let addr = config.socket_addr();

    println!("Serving {} at http://{}", config.root.display(), addr);
    log::info!("serving {:?} on {}", config.root, addr);

    let state = AppState { config: Arc::new(config) };
    let app = handlers::router(state);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(DocError::from)
}
