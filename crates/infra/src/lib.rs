//! Infrastructure layer: the document store and typed repositories.

pub mod repos;
pub mod store;

pub use store::{InMemoryStore, Store};
