//! Schema helpers for route generation.
//!
//! Route definitions are generated outside this crate; these pure
//! functions derive the JSON-schema fragments a generated route needs
//! from a model's validation schema. They are decoupled from the query
//! engine — nothing here touches descriptors or sources.

use serde_json::{Map, Value, json};

/// Whether an operation responds with a single document or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A single document.
    Object,
    /// An ordered list of documents.
    Array,
}

/// Wraps a model's validation-schema properties into a `200` response
/// schema of the given shape.
pub fn response_schema(properties: &Map<String, Value>, shape: ResponseShape) -> Value {
    let object = json!({
        "type": "object",
        "properties": properties,
    });

    match shape {
        ResponseShape::Object => json!({ "200": object }),
        ResponseShape::Array => json!({
            "200": {
                "type": "array",
                "items": object,
            }
        }),
    }
}

/// The JSON-schema property map describing every request field the
/// normalizer recognizes, for embedding into generated list/search route
/// schemas.
pub fn find_options_schema() -> Value {
    json!({
        "query": {
            "type": ["object", "string"],
            "description": "Filter predicate, as an object or a JSON string",
        },
        "q": {
            "type": ["object", "string"],
            "description": "Alias of `query`; `query` wins when both are present",
        },
        "populate": {
            "type": ["object", "string", "array"],
            "description": "Relations to resolve into embedded documents",
        },
        "projection": {
            "type": ["object", "string", "array"],
            "description": "Field selection; `-field` excludes",
        },
        "select": {
            "type": ["object", "string", "array"],
            "description": "Alias of `projection`; `projection` wins when both are present",
        },
        "sort": {
            "type": ["object", "string"],
            "description": "Ordering; `-field` sorts descending",
        },
        "skip": {
            "type": "integer",
            "description": "Number of matching documents to skip",
        },
        "limit": {
            "type": "integer",
            "description": "Result cap; 0 returns zero documents",
        },
        "p": {
            "type": "integer",
            "description": "Alias of `page`; `page` wins when both are present",
        },
        "page": {
            "type": "integer",
            "description": "1-indexed page number; ignored when skip/limit are present",
        },
        "pageSize": {
            "type": "integer",
            "description": "Documents per page",
        },
        "totalCount": {
            "type": "boolean",
            "description": "Whether to compute the pre-pagination total",
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_properties() -> Map<String, Value> {
        match json!({
            "name": { "type": "string" },
            "age": { "type": "integer" },
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn object_shape_wraps_properties() {
        let schema = response_schema(&person_properties(), ResponseShape::Object);
        assert_eq!(schema["200"]["type"], "object");
        assert_eq!(schema["200"]["properties"]["name"]["type"], "string");
    }

    #[test]
    fn array_shape_nests_the_object_as_items() {
        let schema = response_schema(&person_properties(), ResponseShape::Array);
        assert_eq!(schema["200"]["type"], "array");
        assert_eq!(schema["200"]["items"]["properties"]["age"]["type"], "integer");
    }

    #[test]
    fn find_options_cover_every_recognized_field() {
        let schema = find_options_schema();
        for field in [
            "query", "q", "populate", "projection", "select", "sort",
            "skip", "limit", "p", "page", "pageSize", "totalCount",
        ] {
            assert!(schema.get(field).is_some(), "missing `{field}`");
        }
    }
}
