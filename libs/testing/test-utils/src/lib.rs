//! Shared test utilities for the catalog crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongodb")
//! - `TestDataBuilder`: deterministic business codes and names (always available)
//! - `assertions`: assertion helpers (always available)
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!     let db = mongo.database(&builder.database_name());
//!     let product_id = builder.product_code(1);
//! }
//! ```

#[cfg(feature = "mongodb")]
mod mongo;

#[cfg(feature = "mongodb")]
pub use mongo::TestMongo;

/// Seeded test data, so the same test always produces the same codes and names
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Positive product code, distinct for each `n` within one builder
    pub fn product_code(&self, n: i64) -> i64 {
        self.base_code() + n
    }

    /// Positive brand code, distinct for each `n` within one builder
    pub fn brand_code(&self, n: i64) -> i64 {
        self.base_code() + 500_000 + n
    }

    /// Positive customer code, distinct for each `n` within one builder
    pub fn customer_code(&self, n: i64) -> i64 {
        self.base_code() + 900_000 + n
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("product", "main"), "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// MongoDB database names are capped at 63 bytes
    pub fn database_name(&self) -> String {
        format!("catalog_test_{:x}", self.seed)
    }

    fn base_code(&self) -> i64 {
        ((self.seed % 1_000_000) as i64 + 1) * 1_000_000
    }
}

pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that `items` is ordered by `key` descending
    pub fn assert_sorted_desc<T, K: PartialOrd + std::fmt::Debug>(
        items: &[T],
        key: impl Fn(&T) -> K,
        context: &str,
    ) {
        for pair in items.windows(2) {
            let (a, b) = (key(&pair[0]), key(&pair[1]));
            assert!(a >= b, "{}: {:?} listed before {:?}", context, a, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.product_code(1), builder2.product_code(1));
        assert_eq!(builder1.name("brand", "x"), builder2.name("brand", "x"));
    }

    #[test]
    fn test_codes_are_positive_and_distinct() {
        let builder = TestDataBuilder::from_test_name("codes");

        assert!(builder.product_code(0) > 0);
        assert_ne!(builder.product_code(1), builder.product_code(2));
        assert_ne!(builder.product_code(1), builder.brand_code(1));
        assert!(builder.customer_code(1) > 0);
        assert_ne!(builder.customer_code(1), builder.customer_code(2));
        assert_ne!(builder.brand_code(1), builder.customer_code(1));
    }

    #[test]
    fn test_different_names_give_different_databases() {
        let a = TestDataBuilder::from_test_name("test1");
        let b = TestDataBuilder::from_test_name("test2");

        assert_ne!(a.database_name(), b.database_name());
        assert!(a.database_name().len() < 64);
    }

    #[test]
    fn test_assert_sorted_desc() {
        assertions::assert_sorted_desc(&[5, 3, 3, 1], |v| *v, "ratings");
    }
}
