//! Inference Runtimes
//!
//! The engine adapter talks to models only through [`InferenceRuntime`].
//! [`OllamaRuntime`] is the shipped implementation; tests script their own.

mod ollama;
mod traits;

pub use ollama::OllamaRuntime;
pub use traits::{ChatRequest, InferenceRuntime, StreamingToken};
