pub mod document;
pub mod memory;
pub mod postgres;
pub mod store;

pub use document::{parse_id, Collection, StoredDocument};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{scoped, BodyCheck, DocumentStore, StoreConnection, StoreError};
