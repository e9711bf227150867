//! promlive — follow one metric of a Prometheus endpoint live.
//!
//! # Usage
//!
//! ```text
//! promlive watch --url http://127.0.0.1:9100/metrics --interval 5
//! promlive serve --config promlive.toml --listen 0.0.0.0:8480
//! promlive parse metrics.txt --format json
//! ```

use clap::{Parser, Subcommand};

mod commands;

use commands::ScanArgs;

#[derive(Parser)]
#[command(
    name = "promlive",
    about = "Live chart of a Prometheus metrics endpoint",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape on a timer and print the followed metric after every tick
    Watch {
        #[command(flatten)]
        scan: ScanArgs,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Scrape on a timer and serve the chart over the REST API
    Serve {
        #[command(flatten)]
        scan: ScanArgs,
        /// Address to listen on (overrides [server].listen)
        #[arg(long)]
        listen: Option<String>,
    },
    /// Parse an exposition file once and print the aggregated snapshot.
    ///
    /// Use `-` to read from stdin.
    Parse {
        /// Exposition file, or `-` for stdin
        path: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,promlive=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { scan, format } => commands::watch::watch(&scan, &format).await,
        Commands::Serve { scan, listen } => commands::serve::serve(&scan, listen).await,
        Commands::Parse { path, format } => commands::parse::parse(&path, &format),
    }
}
