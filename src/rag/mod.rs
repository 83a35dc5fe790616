pub mod chunker;
pub mod index;
pub mod retriever;

pub use chunker::Chunk;
pub use index::VectorIndex;
pub use retriever::Retriever;
