pub mod handlers;
pub mod search;
pub mod text;

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
