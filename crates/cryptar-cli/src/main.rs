//! cryptar: passphrase-sealed file archives
//!
//! Commands:
//!   pack <paths>...     - bundle files and directories, seal with a passphrase
//!   unpack <archive>    - open an archive and restore its files
//!   list <archive>      - open an archive and print its entry names
//!   extract <archive>   - open an archive and write the raw .tar.zst bundle

mod commands;
mod passphrase;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::Session;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cryptar",
    version,
    about = "Pack files into a passphrase-sealed archive",
    long_about = "cryptar: bundle files into a zstd-compressed tar, sealed with \
                  Argon2id + XChaCha20-Poly1305 under a passphrase.\n\n\
                  The passphrase is read from CRYPTAR_PASSPHRASE if set, otherwise prompted."
)]
struct Cli {
    /// Path to config.toml (default: ~/.config/cryptar/config.toml)
    #[arg(long, short = 'c', env = "CRYPTAR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Use the low-cost key derivation preset (must match when opening)
    #[arg(long, short = 'l', global = true)]
    interactive: bool,

    /// Only print errors, prompts and listings
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Print each path as it is packed or unpacked
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CRYPTAR_LOG", global = true)]
    log: Option<String>,

    /// Log format (json, text)
    #[arg(long, env = "CRYPTAR_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files and directories into an encrypted archive
    Pack {
        /// Files and directories to pack
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Archive to write (default: files.enc)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Do not ask for the passphrase twice
        #[arg(long)]
        no_confirm: bool,
    },

    /// Decrypt an archive and restore its files
    Unpack {
        archive: PathBuf,
        /// Directory to unpack into (default: .)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Decrypt an archive and list its files
    List { archive: PathBuf },

    /// Decrypt an archive and write the compressed bundle without unpacking
    Extract {
        archive: PathBuf,
        /// Bundle to write (default: files.tar.zst)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(cryptar_core::config::default_config_path);
    let config = cryptar_core::CryptarConfig::load(&config_path)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.clone().unwrap_or_else(|| {
        if config.log.format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    });
    init_logging(&level, &format);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        config_found = config_path.exists(),
        "cryptar starting"
    );

    let session = Session::new(config, cli.interactive, cli.quiet, cli.verbose)?;

    match cli.command {
        Commands::Pack {
            paths,
            output,
            no_confirm,
        } => {
            let pass = passphrase::read_passphrase(!no_confirm)?;
            commands::pack(&session, &pass, &paths, output.as_deref()).map(|_| ())
        }
        Commands::Unpack { archive, output } => {
            let pass = passphrase::read_passphrase(false)?;
            commands::unpack(&session, &pass, &archive, output.as_deref()).map(|_| ())
        }
        Commands::List { archive } => {
            let pass = passphrase::read_passphrase(false)?;
            commands::list(&session, &pass, &archive).map(|_| ())
        }
        Commands::Extract { archive, output } => {
            let pass = passphrase::read_passphrase(false)?;
            commands::extract(&session, &pass, &archive, output.as_deref()).map(|_| ())
        }
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays clean for listings.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
