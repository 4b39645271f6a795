//! Store predicates, find options and field updates.
//!
//! [`Filter`] is compiled to MongoDB query syntax in [`Filter::to_document`] and
//! evaluated directly against documents by [`Filter::matches`].

use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Query predicate over entity fields.
///
/// Field names may be dotted paths into embedded documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    Eq(String, Bson),
    /// Field equals any of the values; array fields match on any element
    In(String, Vec<Bson>),
    Compare(String, Comparison, Bson),
    /// Case-insensitive literal substring
    ContainsIgnoreCase(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn is_in<V: Into<Bson>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn gte(field: &str, value: impl Into<Bson>) -> Self {
        Filter::Compare(field.to_string(), Comparison::Gte, value.into())
    }

    pub fn lte(field: &str, value: impl Into<Bson>) -> Self {
        Filter::Compare(field.to_string(), Comparison::Lte, value.into())
    }

    pub fn contains(field: &str, term: &str) -> Self {
        Filter::ContainsIgnoreCase(field.to_string(), term.to_string())
    }

    /// `term` appears in at least one of `fields`.
    pub fn contains_any(fields: &[&str], term: &str) -> Self {
        Filter::Or(fields.iter().map(|f| Filter::contains(f, term)).collect())
    }

    /// Conjunction that drops `All` clauses and collapses trivial cases.
    pub fn and(clauses: Vec<Filter>) -> Self {
        let mut clauses: Vec<Filter> = clauses
            .into_iter()
            .filter(|c| !matches!(c, Filter::All))
            .collect();
        match clauses.len() {
            0 => Filter::All,
            1 => clauses.remove(0),
            _ => Filter::And(clauses),
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            Filter::All => doc! {},
            Filter::Eq(field, value) => single(field, value.clone()),
            Filter::In(field, values) => single(field, doc! { "$in": values.clone() }),
            Filter::Compare(field, op, value) => {
                single(field, single(op.operator(), value.clone()))
            }
            Filter::ContainsIgnoreCase(field, term) => single(
                field,
                doc! { "$regex": regex::escape(term), "$options": "i" },
            ),
            Filter::And(clauses) => {
                let docs: Vec<Document> = clauses
                    .iter()
                    .filter(|c| !matches!(c, Filter::All))
                    .map(Filter::to_document)
                    .collect();
                match docs.len() {
                    0 => doc! {},
                    1 => docs.into_iter().next().unwrap_or_default(),
                    _ => doc! { "$and": docs },
                }
            }
            // `$or` must be non-empty; an empty disjunction matches nothing
            Filter::Or(clauses) if clauses.is_empty() => doc! { "$expr": false },
            Filter::Or(clauses) => {
                let docs: Vec<Document> = clauses.iter().map(Filter::to_document).collect();
                doc! { "$or": docs }
            }
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, expected) => match lookup(document, field) {
                Some(actual) => value_matches(actual, expected),
                None => matches!(expected, Bson::Null),
            },
            Filter::In(field, values) => match lookup(document, field) {
                Some(actual) => values.iter().any(|v| value_matches(actual, v)),
                None => values.iter().any(|v| matches!(v, Bson::Null)),
            },
            Filter::Compare(field, op, bound) => lookup(document, field)
                .and_then(|actual| compare_values(actual, bound))
                .is_some_and(|ordering| op.accepts(ordering)),
            Filter::ContainsIgnoreCase(field, term) => {
                let needle = term.to_lowercase();
                match lookup(document, field) {
                    Some(Bson::String(s)) => s.to_lowercase().contains(&needle),
                    Some(Bson::Array(items)) => items.iter().any(|item| {
                        matches!(item, Bson::String(s) if s.to_lowercase().contains(&needle))
                    }),
                    _ => false,
                }
            }
            Filter::And(clauses) => clauses.iter().all(|c| c.matches(document)),
            Filter::Or(clauses) => clauses.iter().any(|c| c.matches(document)),
        }
    }
}

fn single(key: &str, value: impl Into<Bson>) -> Document {
    let mut document = Document::new();
    document.insert(key, value);
    document
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_document()?.get(part)?;
    }
    Some(current)
}

fn value_matches(actual: &Bson, expected: &Bson) -> bool {
    if let Bson::Array(items) = actual {
        if !matches!(expected, Bson::Array(_)) {
            return items.iter().any(|item| values_equal(item, expected));
        }
    }
    values_equal(actual, expected)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering between two values of comparable kinds; `None` for mixed kinds.
pub(crate) fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort, skip and limit for `find_many`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<(String, SortOrder)>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_asc(mut self, field: &str) -> Self {
        self.sort.push((field.to_string(), SortOrder::Ascending));
        self
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push((field.to_string(), SortOrder::Descending));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for (field, order) in &self.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            sort.insert(field.as_str(), direction);
        }
        Some(sort)
    }

    /// Compare two documents by the configured sort keys. Missing values sort first.
    pub(crate) fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, order) in &self.sort {
            let ordering = match (lookup(a, field), lookup(b, field)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Partial update applied atomically to one document.
///
/// `touch` refreshes `updated_at` through `$max`, so the timestamp never moves backwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    set: Document,
    inc: Document,
    touched_at: Option<BsonDateTime>,
}

pub const UPDATED_AT: &str = "updated_at";

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.set.insert(field, value.into());
        self
    }

    pub fn inc(mut self, field: &str, by: i64) -> Self {
        self.inc.insert(field, by);
        self
    }

    pub fn touch(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.touched_at = Some(BsonDateTime::from_millis(at.timestamp_millis()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty() && self.touched_at.is_none()
    }

    pub fn to_document(&self) -> Document {
        let mut update = Document::new();
        if !self.set.is_empty() {
            update.insert("$set", self.set.clone());
        }
        if !self.inc.is_empty() {
            update.insert("$inc", self.inc.clone());
        }
        if let Some(at) = self.touched_at {
            update.insert("$max", single(UPDATED_AT, at));
        }
        update
    }

    /// Apply the update to an in-memory document with MongoDB's semantics.
    pub(crate) fn apply(&self, document: &mut Document) {
        for (field, value) in &self.set {
            document.insert(field.as_str(), value.clone());
        }
        for (field, by) in &self.inc {
            let by = by.as_i64().unwrap_or_default();
            let next = match document.get(field) {
                Some(Bson::Int32(n)) => Bson::Int64(i64::from(*n) + by),
                Some(Bson::Int64(n)) => Bson::Int64(n + by),
                Some(Bson::Double(n)) => Bson::Double(n + by as f64),
                _ => Bson::Int64(by),
            };
            document.insert(field.as_str(), next);
        }
        if let Some(at) = self.touched_at {
            let newer = match document.get_datetime(UPDATED_AT) {
                Ok(current) => at > *current,
                Err(_) => true,
            };
            if newer {
                document.insert(UPDATED_AT, at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_doc() -> Document {
        doc! {
            "product_name": "Tropical Fish Food Flakes",
            "description": "Nutritious flakes",
            "category": "fish-food",
            "brand_name": "AquaLife",
            "price": 12.5,
            "product_id": 104_i64,
            "availability": true,
            "categories": ["fish", "aquarium"],
            "pet_info": { "pet_type": "fish" },
            "helpful_votes": 2_i32,
        }
    }

    #[test]
    fn test_contains_escapes_regex_metacharacters() {
        let filter = Filter::contains("product_name", "a.b*");
        assert_eq!(
            filter.to_document(),
            doc! { "product_name": { "$regex": "a\\.b\\*", "$options": "i" } }
        );
    }

    #[test]
    fn test_and_collapses() {
        assert_eq!(Filter::and(vec![]), Filter::All);
        assert_eq!(Filter::and(vec![Filter::All, Filter::eq("a", 1)]), Filter::eq("a", 1));
        assert_eq!(
            Filter::and(vec![Filter::eq("a", 1), Filter::eq("b", 2)]).to_document(),
            doc! { "$and": [{ "a": 1 }, { "b": 2 }] }
        );
    }

    #[test]
    fn test_empty_or_matches_nothing() {
        let filter = Filter::Or(vec![]);
        assert_eq!(filter.to_document(), doc! { "$expr": false });
        assert!(!filter.matches(&product_doc()));
    }

    #[test]
    fn test_search_filter_document_shape() {
        let filter = Filter::and(vec![
            Filter::eq("availability", true),
            Filter::contains_any(&["product_name", "category"], "fish"),
        ]);
        assert_eq!(
            filter.to_document(),
            doc! {
                "$and": [
                    { "availability": true },
                    { "$or": [
                        { "product_name": { "$regex": "fish", "$options": "i" } },
                        { "category": { "$regex": "fish", "$options": "i" } },
                    ] },
                ]
            }
        );
    }

    #[test]
    fn test_matches_case_insensitive_substring() {
        let doc = product_doc();
        assert!(Filter::contains("product_name", "FISH").matches(&doc));
        assert!(Filter::contains("category", "h-fo").matches(&doc));
        assert!(!Filter::contains("product_name", "cat").matches(&doc));
        assert!(!Filter::contains("price", "12").matches(&doc));
    }

    #[test]
    fn test_matches_numeric_across_integer_widths() {
        let doc = product_doc();
        assert!(Filter::eq("product_id", 104_i32).matches(&doc));
        assert!(Filter::eq("helpful_votes", 2_i64).matches(&doc));
        assert!(Filter::gte("price", 12_i32).matches(&doc));
        assert!(!Filter::Compare("price".into(), Comparison::Gt, Bson::Double(12.5)).matches(&doc));
        assert!(Filter::lte("price", 12.5).matches(&doc));
    }

    #[test]
    fn test_matches_array_membership_and_paths() {
        let doc = product_doc();
        assert!(Filter::eq("categories", "fish").matches(&doc));
        assert!(Filter::is_in("categories", ["dog", "aquarium"]).matches(&doc));
        assert!(!Filter::is_in("categories", ["dog"]).matches(&doc));
        assert!(Filter::eq("pet_info.pet_type", "fish").matches(&doc));
        assert!(!Filter::eq("missing", "x").matches(&doc));
        assert!(Filter::eq("missing", Bson::Null).matches(&doc));
    }

    #[test]
    fn test_find_options_sort_document() {
        let options = FindOptions::new().sort_desc("helpful_votes").sort_asc("brand_name");
        assert_eq!(
            options.sort_document(),
            Some(doc! { "helpful_votes": -1, "brand_name": 1 })
        );
        assert_eq!(FindOptions::new().sort_document(), None);
    }

    #[test]
    fn test_find_options_compare() {
        let options = FindOptions::new().sort_desc("n");
        let a = doc! { "n": 1 };
        let b = doc! { "n": 2.5 };
        assert_eq!(options.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_field_update_document() {
        let at = chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let update = FieldUpdate::new().set("availability", false).touch(at);
        assert_eq!(
            update.to_document(),
            doc! {
                "$set": { "availability": false },
                "$max": { "updated_at": BsonDateTime::from_millis(1_700_000_000_000) },
            }
        );
        assert!(!update.to_document().contains_key("$inc"));
    }

    #[test]
    fn test_field_update_apply() {
        let earlier = BsonDateTime::from_millis(1_000);
        let later = chrono::DateTime::from_timestamp_millis(2_000).unwrap();
        let mut document = doc! { "helpful_votes": 2_i32, "updated_at": earlier };

        FieldUpdate::new()
            .inc("helpful_votes", 1)
            .touch(later)
            .apply(&mut document);
        assert_eq!(document.get_i64("helpful_votes").unwrap(), 3);
        assert_eq!(document.get_datetime("updated_at").unwrap().timestamp_millis(), 2_000);

        // an older touch never rewinds the timestamp
        FieldUpdate::new()
            .touch(chrono::DateTime::from_timestamp_millis(500).unwrap())
            .apply(&mut document);
        assert_eq!(document.get_datetime("updated_at").unwrap().timestamp_millis(), 2_000);
    }
}
