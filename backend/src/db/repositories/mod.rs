//! Repository implementations module.
//!
//! This module contains the implementations of the repository traits:
//! - `local`: In-memory document store for unit testing and local development
//! - `mongo`: MongoDB implementation (requires the `mongo-repo` feature)
pub mod local;
#[cfg(feature = "mongo-repo")]
pub mod mongo;

pub use local::LocalRepository;
#[cfg(feature = "mongo-repo")]
pub use mongo::MongoRepository;
