//! MathAgent Resolution Engine
//!
//! The pipeline that turns a free-text math question into an assembled
//! answer:
//! - Classification (pattern-based math/safety gate)
//! - Knowledge retrieval (embedding + in-memory vector index)
//! - Conditional web search augmentation
//! - Context composition under a character budget
//! - Answer synthesis (generative model with deterministic fallback,
//!   model replies gated by output moderation)
//! - Response assembly (confidence, sources, reasoning trace)

pub mod assembler;
pub mod augmenter;
pub mod classifier;
pub mod composer;
pub mod fallback;
pub mod index;
pub mod knowledge;
pub mod moderator;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;

pub use assembler::ResponseAssembler;
pub use augmenter::SearchAugmenter;
pub use classifier::Classifier;
pub use composer::ContextComposer;
pub use fallback::FallbackSolver;
pub use index::{InMemoryIndex, IndexedEntry, VectorIndex};
pub use knowledge::seed_index;
pub use moderator::{ModerationVerdict, OutputModerator};
pub use pipeline::Pipeline;
pub use retriever::KnowledgeRetriever;
pub use synthesizer::AnswerSynthesizer;
