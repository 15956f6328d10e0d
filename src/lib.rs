pub mod api;
pub mod backup;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod provision;
pub mod rules;
pub mod service;

pub use config::Config;
pub use error::{Result, WafError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
