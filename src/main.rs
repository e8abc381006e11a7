//! Binary entrypoint for the barbarian CLI.
//!
//! Commands:
//! - `start [--bind <addr>]` - run the web server
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status` - print configuration and account statistics
//!
//! See the library crate docs for module-level details: `barbarian::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use barbarian::config::Config;
use barbarian::server::GameServer;

#[derive(Parser)]
#[command(name = "barbarian")]
#[command(about = "An idle barbarian adventure game for the browser")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Start {
        /// Listen address, overrides server.bind (e.g. 0.0.0.0:8080)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write a default configuration file
    Init,
    /// Show configuration and account statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { bind } => {
            let mut config = Config::load(&cli.config).await?;
            if let Some(addr) = bind {
                config.server.bind = addr;
                config.validate()?;
            }
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting barbarian v{}", env!("CARGO_PKG_VERSION"));
            let server = GameServer::new(config).await?;
            server.run().await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let cfg = Config::load(&cli.config).await?;
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            info!("Data directory ready at {}", cfg.storage.data_dir);
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let server = GameServer::new(config).await?;
            server.show_status().await?;
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config.as_ref().and_then(|c| {
        let path = c.logging.file.as_ref()?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    let Some(f) = file else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
        let _ = builder.try_init();
        return;
    };

    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());
    let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
    // Foreground runs echo to the console as well as the file
    let is_tty = atty::is(atty::Stream::Stdout);

    builder.format(move |fmt, record| {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!("{} [{}] {}", ts, record.level(), record.args());

        if let Ok(mut guard) = write_mutex.lock() {
            let _ = writeln!(guard, "{}", line);
        }

        if record.target() == "security" {
            if let Some(ref sec_path) = security_path {
                if let Ok(mut sf) = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(sec_path)
                {
                    let _ = writeln!(sf, "{}", line);
                }
            }
        }

        if is_tty {
            writeln!(fmt, "{}", line)
        } else {
            Ok(())
        }
    });
    let _ = builder.try_init();
}
