//! Hosted model provider implementations.

pub mod gemini;

pub use gemini::GeminiClient;

// Re-export the provider trait for convenience
pub use super::client::ModelProvider;
