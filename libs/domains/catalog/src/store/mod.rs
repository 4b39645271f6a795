//! Entity store: the only component that touches persisted documents.
//!
//! Two backends implement [`EntityStore`]:
//! - [`MongoStore`] over a MongoDB collection, with every call bounded by a timeout
//! - [`MemoryStore`] holding BSON documents in process, used by tests and local runs

pub mod memory;
pub mod mongo;
pub mod query;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{Comparison, FieldUpdate, Filter, FindOptions, SortOrder};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CatalogResult;

/// A document type persisted in its own collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection name
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages
    const NAME: &'static str;

    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);
}

/// Persistence primitives shared by all repositories.
///
/// Empty results are `None`/empty vectors; `Err` is reserved for store failures.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Insert the entity and return the identifier assigned to it
    async fn insert(&self, entity: &T) -> CatalogResult<ObjectId>;

    async fn find_one(&self, filter: &Filter) -> CatalogResult<Option<T>>;

    async fn find_many(&self, filter: &Filter, options: &FindOptions) -> CatalogResult<Vec<T>>;

    async fn count(&self, filter: &Filter) -> CatalogResult<u64>;

    /// Apply `update` to the document with `id`; returns the matched count
    async fn update_fields(&self, id: ObjectId, update: &FieldUpdate) -> CatalogResult<u64>;

    /// Physically remove the document with `id`; returns the deleted count
    async fn remove(&self, id: ObjectId) -> CatalogResult<u64>;

    /// Mean of a numeric field over matching documents, `None` when nothing matches
    async fn average(&self, filter: &Filter, field: &str) -> CatalogResult<Option<f64>>;
}
