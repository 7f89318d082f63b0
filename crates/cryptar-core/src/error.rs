use std::path::PathBuf;

use thiserror::Error;

pub type CryptarResult<T> = Result<T, CryptarError>;

#[derive(Debug, Error)]
pub enum CryptarError {
    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
