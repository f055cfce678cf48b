//! Client for the external content-generation service.
//!
//! This crate provides:
//! - A typed client for creating and polling long-running generation
//!   jobs identified by opaque job ids
//! - A raw asset fetcher turning a result locator into in-memory bytes
//!
//! Both surfaces are traits so orchestration code can be exercised
//! against in-memory doubles.

pub mod client;
pub mod error;
pub mod fetch;
pub mod types;

pub use client::{GenerationClient, GenerationConfig, GenerationJobs};
pub use error::{GenAiError, GenAiResult};
pub use fetch::{is_remote_locator, AssetFetcher, HttpFetcher};
pub use types::JobPoll;
