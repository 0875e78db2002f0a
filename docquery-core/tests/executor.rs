use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bson::{Document, doc};

use docquery_core::descriptor::QueryDescriptor;
use docquery_core::error::{QueryEngineError, QueryEngineResult};
use docquery_core::executor::QueryExecutor;
use docquery_core::source::DocumentSource;

#[derive(Debug, Default)]
struct StubSource {
    docs: Vec<Document>,
    total: u64,
    fail_find: bool,
    fail_count: bool,
    find_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn find(&self, _collection: &str, _query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find {
            return Err(QueryEngineError::store("find refused"));
        }
        Ok(self.docs.clone())
    }

    async fn count(&self, _collection: &str, _filter: &Document) -> QueryEngineResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_count {
            return Err(QueryEngineError::store("count refused"));
        }
        Ok(self.total)
    }
}

fn seeded() -> StubSource {
    StubSource {
        docs: vec![doc! { "name": "a" }, doc! { "name": "b" }],
        total: 9,
        ..StubSource::default()
    }
}

#[tokio::test]
async fn count_is_skipped_unless_requested() {
    let source = seeded();
    let envelope = QueryExecutor::new(&source)
        .execute("persons", &QueryDescriptor::new())
        .await
        .unwrap();

    assert_eq!(envelope.resources.len(), 2);
    assert_eq!(envelope.total_count, None);
    assert_eq!(source.find_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.count_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn count_runs_alongside_find_when_requested() {
    let source = seeded();
    let query = QueryDescriptor::builder().limit(2).total_count(true).build();
    let envelope = QueryExecutor::new(&source)
        .execute("persons", &query)
        .await
        .unwrap();

    // The total reflects the filter's matches, not the capped page.
    assert_eq!(envelope.resources.len(), 2);
    assert_eq!(envelope.total_count, Some(9));
    assert_eq!(source.count_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn count_failure_fails_the_whole_operation() {
    let source = StubSource { fail_count: true, ..seeded() };
    let query = QueryDescriptor::builder().total_count(true).build();
    let err = QueryExecutor::new(&source)
        .execute("persons", &query)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryEngineError::Store(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn find_failure_fails_the_whole_operation() {
    let source = StubSource { fail_find: true, ..seeded() };
    let query = QueryDescriptor::builder().total_count(true).build();
    let err = QueryExecutor::new(&source)
        .execute("persons", &query)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryEngineError::Store(message) if message.contains("find refused")));
}

#[tokio::test]
async fn resources_preserve_source_order() {
    let source = StubSource {
        docs: vec![doc! { "n": 1 }, doc! { "n": 2 }, doc! { "n": 3 }],
        ..StubSource::default()
    };
    let envelope = QueryExecutor::new(&source)
        .execute("persons", &QueryDescriptor::new())
        .await
        .unwrap();

    let order: Vec<i32> = envelope
        .resources
        .iter()
        .map(|d| d.get_i32("n").unwrap())
        .collect();
    assert_eq!(order, [1, 2, 3]);
}
