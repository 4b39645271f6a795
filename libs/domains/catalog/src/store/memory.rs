//! In-process entity store.
//!
//! Entities are kept as BSON documents so filters, sorting and updates behave
//! the way they do against MongoDB.

use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Entity, EntityStore, FieldUpdate, Filter, FindOptions};
use crate::error::CatalogResult;

pub struct MemoryStore<T: Entity> {
    documents: Arc<RwLock<Vec<Document>>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            _entity: PhantomData,
        }
    }

    /// Number of stored documents, including soft-deleted ones
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same documents
impl<T: Entity> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
            _entity: PhantomData,
        }
    }
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    matches!(document.get("_id"), Some(Bson::ObjectId(current)) if current == id)
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn insert(&self, entity: &T) -> CatalogResult<ObjectId> {
        let id = ObjectId::new();
        let mut entity = entity.clone();
        entity.set_id(id);
        let document = bson::to_document(&entity)?;

        self.documents.write().await.push(document);
        Ok(id)
    }

    async fn find_one(&self, filter: &Filter) -> CatalogResult<Option<T>> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|document| filter.matches(document))
            .map(|document| bson::from_document(document.clone()))
            .transpose()
            .map_err(Into::into)
    }

    async fn find_many(&self, filter: &Filter, options: &FindOptions) -> CatalogResult<Vec<T>> {
        let documents = self.documents.read().await;
        let mut matched: Vec<&Document> = documents
            .iter()
            .filter(|document| filter.matches(document))
            .collect();
        // stable sort keeps insertion order for ties
        matched.sort_by(|a, b| options.compare(a, b));

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| bson::from_document(document.clone()).map_err(Into::into))
            .collect()
    }

    async fn count(&self, filter: &Filter) -> CatalogResult<u64> {
        let documents = self.documents.read().await;
        Ok(documents.iter().filter(|document| filter.matches(document)).count() as u64)
    }

    async fn update_fields(&self, id: ObjectId, update: &FieldUpdate) -> CatalogResult<u64> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|document| has_id(document, &id)) {
            Some(document) => {
                update.apply(document);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: ObjectId) -> CatalogResult<u64> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|document| !has_id(document, &id));
        Ok((before - documents.len()) as u64)
    }

    async fn average(&self, filter: &Filter, field: &str) -> CatalogResult<Option<f64>> {
        let documents = self.documents.read().await;
        let values: Vec<f64> = documents
            .iter()
            .filter(|document| filter.matches(document))
            .filter_map(|document| match document.get(field) {
                Some(Bson::Double(v)) => Some(*v),
                Some(Bson::Int32(v)) => Some(f64::from(*v)),
                Some(Bson::Int64(v)) => Some(*v as f64),
                _ => None,
            })
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}
