pub mod config;
pub mod driver;
pub mod error;
pub mod parser;
pub mod runner;

// Re-export common items
pub use config::ReplayConfig;
pub use error::ReplayError;
pub use runner::run_recording;
