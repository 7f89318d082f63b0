//! Passphrase acquisition: environment override or interactive prompt

use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};

/// Environment variable consulted before prompting (for scripted use).
pub const PASSPHRASE_ENV: &str = "CRYPTAR_PASSPHRASE";

/// Read the archive passphrase.
///
/// `CRYPTAR_PASSPHRASE` wins if set. Otherwise the terminal is prompted; with
/// `confirm` the passphrase must be typed twice and mismatches re-prompt.
pub fn read_passphrase(confirm: bool) -> Result<SecretString> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        let pass = SecretString::from(value);
        if pass.expose_secret().is_empty() {
            bail!("{PASSPHRASE_ENV} is set but empty");
        }
        return Ok(pass);
    }

    read_with(|prompt| rpassword::prompt_password(prompt), confirm)
}

/// Prompt loop behind [`read_passphrase`], with the terminal abstracted out.
pub fn read_with<F>(mut prompt: F, confirm: bool) -> Result<SecretString>
where
    F: FnMut(&str) -> std::io::Result<String>,
{
    loop {
        let pass = SecretString::from(prompt("Archive passphrase: ").context("reading passphrase")?);
        if pass.expose_secret().is_empty() {
            eprintln!("Passphrase must not be empty.");
            continue;
        }

        if !confirm {
            return Ok(pass);
        }

        let again = SecretString::from(prompt("Confirm: ").context("reading confirmation")?);
        if pass.expose_secret() == again.expose_secret() {
            return Ok(pass);
        }
        eprintln!("Passphrases don't match.");
    }
}
