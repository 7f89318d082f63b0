//! `pack`, `unpack`, `list` and `extract`

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

use cryptar_core::config::{CryptoConfig, CryptarConfig};
use cryptar_crypto::{CostParams, CostPreset, Sealer};

/// Everything a command needs besides its own arguments.
pub struct Session {
    pub config: CryptarConfig,
    pub sealer: Sealer,
    pub quiet: bool,
    pub verbose: bool,
}

impl Session {
    pub fn new(config: CryptarConfig, interactive: bool, quiet: bool, verbose: bool) -> Result<Self> {
        let cost = cost_params(&config.crypto, interactive);
        let sealer = Sealer::new(cost).context("invalid key derivation settings")?;
        tracing::debug!(?cost, "key derivation cost selected");

        Ok(Self {
            config,
            sealer,
            quiet,
            // quiet overrides verbose
            verbose: verbose && !quiet,
        })
    }

    fn say(&self, msg: &str) {
        if !self.quiet {
            println!("{msg}");
        }
    }

    fn spinner(&self, msg: &'static str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn finish(&self, started: Instant) {
        self.say(&format!("Completed in {:.2?}.", started.elapsed()));
    }
}

/// Preset chosen by flag or config, then per-field config overrides.
pub fn cost_params(crypto: &CryptoConfig, interactive_flag: bool) -> CostParams {
    let preset = if interactive_flag || crypto.interactive {
        CostPreset::Interactive
    } else {
        CostPreset::Archival
    };

    let mut cost = preset.params();
    if let Some(mem) = crypto.argon2_mem_cost_kib {
        cost.mem_cost_kib = mem;
    }
    if let Some(time) = crypto.argon2_time_cost {
        cost.time_cost = time;
    }
    if let Some(lanes) = crypto.argon2_parallelism {
        cost.parallelism = lanes;
    }
    cost
}

// ── `cryptar pack` ─────────────────────────────────────────────────────────────

pub fn pack(
    session: &Session,
    passphrase: &SecretString,
    paths: &[PathBuf],
    output: Option<&Path>,
) -> Result<PathBuf> {
    let started = Instant::now();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| session.config.archive.pack_output.clone());

    session.say("Packing files...");
    let packed = cryptar_archive::pack_paths(paths, session.config.archive.compression_level)?;
    if session.verbose {
        for entry in &packed.entries {
            println!("Pack file {}", entry.display());
        }
    }
    let bundle = Zeroizing::new(packed.bytes);

    let pb = session.spinner("Encrypting archive...");
    let envelope = session
        .sealer
        .seal(passphrase.expose_secret().as_bytes(), &bundle);
    pb.finish_and_clear();
    let envelope = envelope.context("encrypting archive")?;

    session.say("Writing file...");
    write_private(&output, &envelope)?;

    tracing::info!(
        output = %output.display(),
        entries = packed.entries.len(),
        bytes = envelope.len(),
        "archive written"
    );
    session.finish(started);
    Ok(output)
}

// ── `cryptar unpack` ───────────────────────────────────────────────────────────

pub fn unpack(
    session: &Session,
    passphrase: &SecretString,
    archive: &Path,
    output: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let started = Instant::now();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| session.config.archive.unpack_output.clone());

    let bundle = decrypt_archive(session, passphrase, archive)?;

    session.say("Unpacking files...");
    let names = cryptar_archive::unpack(&bundle, &output)
        .with_context(|| format!("unpacking into {}", output.display()))?;
    if session.verbose {
        for name in &names {
            println!("{}", name.display());
        }
    }

    session.finish(started);
    Ok(names)
}

// ── `cryptar list` ─────────────────────────────────────────────────────────────

pub fn list(session: &Session, passphrase: &SecretString, archive: &Path) -> Result<Vec<PathBuf>> {
    let bundle = decrypt_archive(session, passphrase, archive)?;
    let names = cryptar_archive::list(&bundle)?;
    for name in &names {
        println!("{}", name.display());
    }
    Ok(names)
}

// ── `cryptar extract` ──────────────────────────────────────────────────────────

pub fn extract(
    session: &Session,
    passphrase: &SecretString,
    archive: &Path,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let started = Instant::now();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| session.config.archive.extract_output.clone());

    let bundle = decrypt_archive(session, passphrase, archive)?;

    session.say("Extracting bundle...");
    write_private(&output, &bundle)?;

    session.finish(started);
    Ok(output)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn decrypt_archive(
    session: &Session,
    passphrase: &SecretString,
    archive: &Path,
) -> Result<Zeroizing<Vec<u8>>> {
    session.say("Reading encrypted archive...");
    let envelope = std::fs::read(archive)
        .with_context(|| format!("reading archive: {}", archive.display()))?;

    let pb = session.spinner("Decrypting archive...");
    let bundle = session
        .sealer
        .open(passphrase.expose_secret().as_bytes(), &envelope);
    pb.finish_and_clear();

    let bundle = bundle.with_context(|| {
        format!(
            "decrypting {} (wrong passphrase, wrong cost preset, or corrupted file)",
            archive.display()
        )
    })?;
    Ok(Zeroizing::new(bundle))
}

/// Write `data` to `path`, readable by the owner only on Unix.
///
/// An existing file is narrowed to 0600 before anything is written to it.
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("restricting permissions on {}", path.display()))?;
    }
    file.write_all(data)
        .with_context(|| format!("writing {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;
    Ok(())
}
