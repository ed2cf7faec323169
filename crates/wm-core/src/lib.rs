//! Wavemill selector core: data model, configuration and error taxonomy shared by the
//! label-derivation and evaluation crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{SelectorConfig, SELECTOR_CONFIG};
pub use error::{Result, SelectorError};
pub use types::*;

#[cfg(test)]
mod tests;
