//! Vector index for chunk retrieval: exact cosine search over normalized
//! embeddings, LanceDB persistence and the claim [`Retriever`].

pub mod build;
pub mod index;
pub mod retriever;
pub mod schema;
pub mod store;

pub use build::{build_index, embed_chunks, fingerprint, is_current, BuildOutcome};
pub use index::{FlatIndex, SearchIndex};
pub use retriever::Retriever;
