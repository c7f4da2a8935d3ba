//! Hosted model integration for veriscan.
//!
//! The [`ModelProvider`] trait is the seam between the detector and the
//! model service. [`GeminiClient`] is the production implementation; tests
//! substitute their own providers.
//!
//! ```ignore
//! use std::sync::Arc;
//! use veriscan::llm::{GeminiClient, ModelProvider};
//!
//! let client: Arc<dyn ModelProvider> = Arc::new(GeminiClient::from_env()?);
//! ```

pub mod client;
pub mod providers;

pub use client::{ContentPart, ModelProvider, ModelReply, ModelRequest};
pub use providers::GeminiClient;
