//! Collaborator interfaces consumed by the resolution pipeline
//!
//! Three capability seams, each with a real HTTP client and a
//! deterministic local stand-in:
//! - [`Embedder`] - question embedding for the knowledge index
//! - [`SearchProvider`] - external web search (fail-closed)
//! - [`GenerativeModel`] - generative completion (fail-closed)

pub mod embedder;
pub mod generative;
pub mod search;

pub use embedder::{create_embedder, Embedder, HashEmbedder, OpenAiEmbedder};
pub use generative::{create_generative_model, GeminiClient, GenerativeModel};
pub use search::{create_search_provider, GoogleSearchClient, SearchProvider};
