//! Step inputs: parsing, validation, and the cache level setting.

pub mod config;

pub use config::{split_arguments, CacheLevel, Config, ConfigError, StepInputs};
