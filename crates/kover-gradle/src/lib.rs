#![forbid(unsafe_code)]
//! Gradle workspace adapter: project discovery, task variants, report artifacts,
//! and cache path collection.

pub mod artifact;
pub mod cache;
pub mod error;
pub mod project;
pub mod task;

pub use artifact::Artifact;
pub use cache::{CacheCollector, EnvmanCacheCollector};
pub use error::GradleError;
pub use project::Project;
pub use task::{Task, Variants};
