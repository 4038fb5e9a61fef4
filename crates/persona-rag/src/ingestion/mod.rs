//! Document loading and chunking

pub mod chunker;
pub mod loader;

pub use chunker::RecursiveChunker;
pub use loader::load_documents;
