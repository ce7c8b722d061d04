pub mod app;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod storage;
pub mod test_utils;
pub mod validation;

pub use error::{FlowError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
