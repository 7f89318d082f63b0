pub mod config;
pub mod error;

pub use config::CryptarConfig;
pub use error::{CryptarError, CryptarResult};
