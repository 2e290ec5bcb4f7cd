mod contradiction_store;
mod embedding;
mod event_store;
mod memory_store;
mod reasoner;

pub use contradiction_store::IContradictionStore;
pub use embedding::IEmbeddingProvider;
pub use event_store::IEventStore;
pub use memory_store::IMemoryStore;
pub use reasoner::{IReasoner, NoOpReasoner};
