//! Canonical query descriptors for document collection reads.
//!
//! A [`QueryDescriptor`] is the single internal representation that all
//! accepted request shapes (objects, JSON strings, token lists) collapse
//! into before anything reaches a store. It is constructed fresh per
//! request — by the normalizer or through [`QueryDescriptor::builder`] —
//! and is read-only from then on: the executor and the sources only ever
//! see `&QueryDescriptor`.
//!
//! # Example
//!
//! ```ignore
//! use docquery::descriptor::{QueryDescriptor, SortDirection};
//! use bson::doc;
//!
//! let query = QueryDescriptor::builder()
//!     .filter(doc! { "status": "active" })
//!     .sort("created_at", SortDirection::Desc)
//!     .skip(10)
//!     .limit(10)
//!     .total_count(true)
//!     .build();
//! ```

use bson::Document;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// One entry of an ordered sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Creates a sort entry.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

/// Normalized field selection.
///
/// Both the `projection` and `select` request inputs, in any of their
/// accepted shapes, collapse into one pair of include/exclude lists.
/// An empty projection returns documents unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Projection {
    /// Creates an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a field for inclusion.
    pub fn push_include(&mut self, field: impl Into<String>) {
        self.include.push(field.into());
    }

    /// Marks a field for exclusion.
    pub fn push_exclude(&mut self, field: impl Into<String>) {
        self.exclude.push(field.into());
    }

    /// Fields marked for inclusion.
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Fields marked for exclusion.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Returns true when no field selection was specified.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Returns true when the field is explicitly excluded.
    pub fn excludes(&self, field: &str) -> bool {
        self.exclude.iter().any(|f| f == field)
    }
}

/// A relation to resolve into embedded documents, with optional
/// sub-options restricting the fields of the resolved documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Populate {
    /// The reference field on the parent document.
    pub path: String,
    /// Field selection applied to the resolved documents.
    pub select: Projection,
}

impl Populate {
    /// Creates a populate directive for a reference field.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), select: Projection::new() }
    }

    /// Attaches a field selection for the resolved documents.
    pub fn with_select(mut self, select: Projection) -> Self {
        self.select = select;
        self
    }
}

/// The canonical, normalized form of one collection read.
///
/// Immutable once built. The filter is structurally validated but
/// semantically opaque at this layer: it is handed to the store verbatim,
/// and an empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    filter: Document,
    projection: Projection,
    sort: Vec<Sort>,
    populate: Vec<Populate>,
    skip: u64,
    limit: Option<u64>,
    wants_total_count: bool,
}

impl QueryDescriptor {
    /// Creates a descriptor that matches everything with no pagination cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder for fluent construction.
    pub fn builder() -> QueryDescriptorBuilder {
        QueryDescriptorBuilder::new()
    }

    pub(crate) fn from_parts(
        filter: Document,
        projection: Projection,
        sort: Vec<Sort>,
        populate: Vec<Populate>,
        skip: u64,
        limit: Option<u64>,
        wants_total_count: bool,
    ) -> Self {
        Self { filter, projection, sort, populate, skip, limit, wants_total_count }
    }

    /// The match predicate, passed to the store verbatim.
    pub fn filter(&self) -> &Document {
        &self.filter
    }

    /// The normalized field selection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Ordered sort specification.
    pub fn sort(&self) -> &[Sort] {
        &self.sort
    }

    /// Ordered population directives.
    pub fn populate(&self) -> &[Populate] {
        &self.populate
    }

    /// Number of matching documents to skip.
    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Result cap. `Some(0)` means "return zero documents"; `None` means
    /// the configured default cap (or no cap when none is configured) —
    /// a cap of zero is never a synonym for "unlimited".
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Whether a separate total count of the filter's matches was requested.
    pub fn wants_total_count(&self) -> bool {
        self.wants_total_count
    }
}

/// Fluent builder for [`QueryDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptorBuilder {
    query: QueryDescriptor,
}

impl QueryDescriptorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self { query: QueryDescriptor::default() }
    }

    /// Sets the match predicate.
    pub fn filter(mut self, filter: Document) -> Self {
        self.query.filter = filter;
        self
    }

    /// Sets the field selection.
    pub fn projection(mut self, projection: Projection) -> Self {
        self.query.projection = projection;
        self
    }

    /// Appends a sort key. Earlier keys take precedence.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.push(Sort::new(field, direction));
        self
    }

    /// Appends a population directive for a reference field.
    pub fn populate(mut self, path: impl Into<String>) -> Self {
        self.query.populate.push(Populate::new(path));
        self
    }

    /// Appends a population directive with sub-options.
    pub fn populate_with(mut self, populate: Populate) -> Self {
        self.query.populate.push(populate);
        self
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.query.skip = skip;
        self
    }

    /// Sets the result cap. A cap of zero returns zero documents.
    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Requests (or suppresses) the separate total count query.
    pub fn total_count(mut self, wants_total_count: bool) -> Self {
        self.query.wants_total_count = wants_total_count;
        self
    }

    /// Builds and returns the final descriptor.
    pub fn build(self) -> QueryDescriptor {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn builder_collects_ordered_sort_and_populate() {
        let query = QueryDescriptor::builder()
            .filter(doc! { "status": "active" })
            .sort("age", SortDirection::Desc)
            .sort("name", SortDirection::Asc)
            .populate("cats")
            .skip(5)
            .limit(10)
            .build();

        assert_eq!(query.filter(), &doc! { "status": "active" });
        assert_eq!(query.sort().len(), 2);
        assert_eq!(query.sort()[0].field, "age");
        assert_eq!(query.sort()[1].direction, SortDirection::Asc);
        assert_eq!(query.populate()[0].path, "cats");
        assert_eq!(query.skip(), 5);
        assert_eq!(query.limit(), Some(10));
        assert!(!query.wants_total_count());
    }

    #[test]
    fn default_descriptor_matches_everything_uncapped() {
        let query = QueryDescriptor::new();
        assert!(query.filter().is_empty());
        assert!(query.projection().is_empty());
        assert_eq!(query.limit(), None);
        assert_eq!(query.skip(), 0);
    }
}
