use std::collections::HashMap;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use tracing::debug;

use docquery_core::{
    descriptor::{Populate, Projection, QueryDescriptor, Sort, SortDirection},
    error::{QueryEngineError, QueryEngineResult},
    source::DocumentSource,
};

type RelationMap = HashMap<String, HashMap<String, String>>;

#[derive(Debug)]
pub struct MongoSource {
    client: Client,
    database: String,
    relations: RelationMap,
}

impl MongoSource {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database, relations: RelationMap::new() }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoSourceBuilder {
        MongoSourceBuilder::new(dsn, database)
    }

    /// Registers a relation: `populate` directives for `field` on documents
    /// of `collection` resolve against `target`'s `_id` values.
    pub fn with_relation(mut self, collection: &str, field: &str, target: &str) -> Self {
        self.relations
            .entry(collection.to_string())
            .or_default()
            .insert(field.to_string(), target.to_string());
        self
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    async fn resolve_populate(
        &self,
        collection: &str,
        page: &mut [Document],
        directives: &[Populate],
    ) -> QueryEngineResult<()> {
        for directive in directives {
            let target = self
                .relations
                .get(collection)
                .and_then(|fields| fields.get(&directive.path))
                .ok_or_else(|| {
                    QueryEngineError::store(format!(
                        "unresolved relation `{}` on collection `{collection}`",
                        directive.path
                    ))
                })?;

            let mut ids: Vec<Bson> = Vec::new();
            for document in page.iter() {
                match document.get(&directive.path) {
                    Some(Bson::Array(values)) => ids.extend(values.iter().cloned()),
                    Some(Bson::Null) | None => {}
                    Some(value) => ids.push(value.clone()),
                }
            }

            let related: Vec<Document> = if ids.is_empty() {
                Vec::new()
            } else {
                let mut options = FindOptions::default();
                options.projection = stitchable_projection(&directive.select);

                self.get_collection(target)
                    .find(doc! { "_id": { "$in": ids } })
                    .with_options(options)
                    .await
                    .map_err(|e| QueryEngineError::store(e))?
                    .try_collect()
                    .await
                    .map_err(|e| QueryEngineError::store(e))?
            };

            let drop_id = directive.select.excludes("_id");
            for document in page.iter_mut() {
                match document.get(&directive.path).cloned() {
                    Some(Bson::Array(values)) => {
                        let resolved = values
                            .iter()
                            .filter_map(|id| find_by_id(&related, id))
                            .map(|found| Bson::Document(strip_id(found, drop_id)))
                            .collect::<Vec<_>>();
                        document.insert(directive.path.clone(), Bson::Array(resolved));
                    }
                    Some(Bson::Null) | None => {}
                    Some(id) => {
                        if let Some(found) = find_by_id(&related, &id) {
                            document.insert(
                                directive.path.clone(),
                                Bson::Document(strip_id(found, drop_id)),
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        // The driver reads a limit of 0 as "no limit"; a zero cap means
        // zero documents.
        if query.limit() == Some(0) {
            return Ok(vec![]);
        }

        let mut options = FindOptions::default();
        if let Some(limit) = query.limit() {
            options.limit = Some(limit as i64);
        }
        if query.skip() > 0 {
            options.skip = Some(query.skip());
        }
        options.sort = sort_document(query.sort());
        options.projection = projection_document(query.projection());

        let mut page: Vec<Document> = self
            .get_collection(collection)
            .find(query.filter().clone())
            .with_options(options)
            .await
            .map_err(|e| QueryEngineError::store(e))?
            .try_collect()
            .await
            .map_err(|e| QueryEngineError::store(e))?;

        self.resolve_populate(collection, &mut page, query.populate())
            .await?;

        debug!(collection, returned = page.len(), "mongodb source find");

        Ok(page)
    }

    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64> {
        self.get_collection(collection)
            .count_documents(filter.clone())
            .await
            .map_err(|e| QueryEngineError::store(e))
    }
}

fn sort_document(sort: &[Sort]) -> Option<Document> {
    if sort.is_empty() {
        return None;
    }

    let mut document = Document::new();
    for key in sort {
        document.insert(
            key.field.clone(),
            match key.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            },
        );
    }

    Some(document)
}

fn projection_document(projection: &Projection) -> Option<Document> {
    if projection.is_empty() {
        return None;
    }

    let mut document = Document::new();
    if projection.include().is_empty() {
        for field in projection.exclude() {
            document.insert(field.clone(), 0);
        }
    } else {
        for field in projection.include() {
            document.insert(field.clone(), 1);
        }
        if projection.excludes("_id") {
            document.insert("_id", 0);
        }
    }

    Some(document)
}

/// Projection for fetching related documents: `_id` stays server-side
/// regardless of the select, stitching needs it.
fn stitchable_projection(select: &Projection) -> Option<Document> {
    let mut document = projection_document(select)?;
    document.remove("_id");

    if document.is_empty() { None } else { Some(document) }
}

fn strip_id(found: &Document, drop_id: bool) -> Document {
    let mut found = found.clone();
    if drop_id {
        found.remove("_id");
    }
    found
}

fn find_by_id<'a>(related: &'a [Document], id: &Bson) -> Option<&'a Document> {
    related.iter().find(|document| document.get("_id") == Some(id))
}

pub struct MongoSourceBuilder {
    dsn: String,
    database: String,
    relations: RelationMap,
}

impl MongoSourceBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            relations: RelationMap::new(),
        }
    }

    pub fn with_relation(mut self, collection: &str, field: &str, target: &str) -> Self {
        self.relations
            .entry(collection.to_string())
            .or_default()
            .insert(field.to_string(), target.to_string());
        self
    }

    pub async fn build(self) -> QueryEngineResult<MongoSource> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| QueryEngineError::store(e))?;
        let client = Client::with_options(options).map_err(|e| QueryEngineError::store(e))?;

        Ok(MongoSource {
            client,
            database: self.database,
            relations: self.relations,
        })
    }
}
