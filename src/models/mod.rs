//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for the data types and configuration shared
//! across the engine, the providers and the API.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
