//! Ports to external collaborators the core depends on but does not
//! implement (§6): embedding, text generation, relational persistence, the
//! vector index, and filesystem watching.

mod catalog_store;
mod embedder;
mod fs_watcher;
mod llm;
mod vector_store;

pub use catalog_store::{CatalogStore, FtsHit, JobRepository, JobRunRepository, ProjectRepository};
pub use embedder::Embedder;
pub use fs_watcher::{FsEvent, FsWatcher};
pub use llm::{GenerateOptions, Llm};
pub use vector_store::{VectorFilter, VectorHit, VectorStore};
