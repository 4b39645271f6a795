//! MongoDB implementation of EntityStore

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::FindOptions as MongoFindOptions,
    Collection, Database,
};
use std::future::{Future, IntoFuture};
use std::time::Duration;

use super::{Entity, EntityStore, FieldUpdate, Filter, FindOptions};
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Entity store backed by one MongoDB collection.
///
/// Dropping a returned future abandons the driver call; every call is also
/// bounded by `operation_timeout`.
pub struct MongoStore<T: Entity> {
    collection: Collection<T>,
    operation_timeout: Duration,
}

impl<T: Entity> MongoStore<T> {
    pub fn new(db: &Database) -> Self {
        Self::with_timeout(db, DEFAULT_OPERATION_TIMEOUT)
    }

    pub fn with_timeout(db: &Database, operation_timeout: Duration) -> Self {
        Self {
            collection: db.collection::<T>(T::COLLECTION),
            operation_timeout,
        }
    }

    /// Get the underlying collection for index management
    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    async fn bounded<R, F>(&self, operation: &str, call: F) -> CatalogResult<R>
    where
        F: Future<Output = Result<R, mongodb::error::Error>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result.map_err(|e| {
                CatalogError::from(e).context(format_args!("{}.{}", T::COLLECTION, operation))
            }),
            Err(_) => Err(CatalogError::Store(format!(
                "{}.{} timed out after {:?}",
                T::COLLECTION,
                operation,
                self.operation_timeout
            ))),
        }
    }
}

impl<T: Entity> Clone for MongoStore<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            operation_timeout: self.operation_timeout,
        }
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MongoStore<T> {
    async fn insert(&self, entity: &T) -> CatalogResult<ObjectId> {
        let result = self
            .bounded("insert", self.collection.insert_one(entity).into_future())
            .await?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(CatalogError::Store(format!(
                "{}.insert returned a non-ObjectId identifier: {}",
                T::COLLECTION,
                other
            ))),
        }
    }

    async fn find_one(&self, filter: &Filter) -> CatalogResult<Option<T>> {
        self.bounded(
            "find_one",
            self.collection.find_one(filter.to_document()).into_future(),
        )
        .await
    }

    async fn find_many(&self, filter: &Filter, options: &FindOptions) -> CatalogResult<Vec<T>> {
        let mut find_options = MongoFindOptions::default();
        find_options.sort = options.sort_document();
        find_options.skip = options.skip;
        find_options.limit = options
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));

        let query = filter.to_document();
        self.bounded("find_many", async {
            let cursor = self
                .collection
                .find(query)
                .with_options(find_options)
                .await?;
            cursor.try_collect().await
        })
        .await
    }

    async fn count(&self, filter: &Filter) -> CatalogResult<u64> {
        self.bounded(
            "count",
            self.collection
                .count_documents(filter.to_document())
                .into_future(),
        )
        .await
    }

    async fn update_fields(&self, id: ObjectId, update: &FieldUpdate) -> CatalogResult<u64> {
        if update.is_empty() {
            return self.count(&Filter::eq("_id", id)).await;
        }

        let result = self
            .bounded(
                "update_fields",
                self.collection
                    .update_one(doc! { "_id": id }, update.to_document())
                    .into_future(),
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn remove(&self, id: ObjectId) -> CatalogResult<u64> {
        let result = self
            .bounded(
                "remove",
                self.collection.delete_one(doc! { "_id": id }).into_future(),
            )
            .await?;
        Ok(result.deleted_count)
    }

    async fn average(&self, filter: &Filter, field: &str) -> CatalogResult<Option<f64>> {
        let pipeline = vec![
            doc! { "$match": filter.to_document() },
            doc! { "$group": { "_id": Bson::Null, "average": { "$avg": format!("${}", field) } } },
        ];

        let first: Option<Document> = self
            .bounded("average", async {
                let mut cursor = self.collection.aggregate(pipeline).await?;
                cursor.try_next().await
            })
            .await?;

        Ok(first.and_then(|group| match group.get("average") {
            Some(Bson::Double(avg)) => Some(*avg),
            Some(Bson::Int32(avg)) => Some(f64::from(*avg)),
            Some(Bson::Int64(avg)) => Some(*avg as f64),
            _ => None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    #[tokio::test]
    async fn test_store_targets_entity_collection() {
        // Client construction is lazy; no server is contacted here.
        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let store = MongoStore::<Product>::with_timeout(
            &client.database("catalog_test"),
            Duration::from_millis(250),
        );

        assert_eq!(store.collection().name(), "products");
        assert_eq!(store.operation_timeout, Duration::from_millis(250));
    }
}
