//! Query execution and result envelope assembly.

use bson::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{descriptor::QueryDescriptor, error::QueryEngineResult, source::DocumentSource};

/// The combined result of one collection read.
///
/// `resources` preserves store-returned order. `total_count`, when
/// present, reflects the count of documents matching the filter before
/// skip/limit were applied, so it may exceed `resources.len()`; it
/// serializes as `totalCount` and is omitted entirely (not null) when it
/// was not requested.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    /// The matching documents, in store order.
    pub resources: Vec<Document>,
    /// Total matches of the filter, independent of pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// Issues normalized queries against a document source.
///
/// When a total count is requested the find and the count run
/// concurrently; they are independent read-only queries with no ordering
/// dependency. A failure on either side drops the other and propagates
/// the first error — a partial envelope is never returned. Because the
/// two queries are not transactional, `total_count` may be stale relative
/// to `resources` under concurrent writes to the same collection.
#[derive(Debug)]
pub struct QueryExecutor<S: DocumentSource> {
    source: S,
}

impl<S: DocumentSource> QueryExecutor<S> {
    /// Creates an executor over a source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Runs the descriptor against a collection and assembles the envelope.
    pub async fn execute(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<ResultEnvelope> {
        debug!(
            collection,
            skip = query.skip(),
            limit = ?query.limit(),
            total_count = query.wants_total_count(),
            "executing collection read"
        );

        if query.wants_total_count() {
            // The count sees the filter only; a filtered-and-paginated
            // find cannot report the pre-pagination total.
            let (resources, total_count) = futures::try_join!(
                self.source.find(collection, query),
                self.source.count(collection, query.filter()),
            )?;

            return Ok(ResultEnvelope { resources, total_count: Some(total_count) });
        }

        let resources = self.source.find(collection, query).await?;

        Ok(ResultEnvelope { resources, total_count: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn envelope_omits_total_count_when_absent() {
        let envelope = ResultEnvelope {
            resources: vec![doc! { "name": "a" }],
            total_count: None,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("totalCount").is_none());
    }

    #[test]
    fn envelope_serializes_total_count_in_camel_case() {
        let envelope = ResultEnvelope { resources: vec![], total_count: Some(12) };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["totalCount"], 12);
    }
}
