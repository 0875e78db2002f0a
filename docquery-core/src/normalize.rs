//! Parameter normalization: raw request fields to a [`QueryDescriptor`].
//!
//! Requests reach the engine as a loosely-typed JSON map, whether the
//! transport was a query string (every value a string) or a request body
//! (native JSON types). Each recognized field may arrive in several
//! shapes — an object, a JSON-encoded string, or a whitespace/comma
//! delimited token list — and every shape collapses into the one canonical
//! representation before anything reaches a store.
//!
//! Recognized fields and aliases:
//!
//! | field       | aliases      | accepted shapes                      |
//! |-------------|--------------|--------------------------------------|
//! | `query`     | `q`          | object, JSON-object string           |
//! | `projection`| `select`     | object, string, array of tokens      |
//! | `sort`      |              | object, string, array of tokens      |
//! | `populate`  |              | object, string, array                |
//! | `skip`/`limit`/`page` (`p`)/`pageSize` | | integer, integer string |
//! | `totalCount`|              | boolean, `"true"/"false"/"1"/"0"`    |
//!
//! In every alias pair the full name wins when both are present. Unknown
//! or missing fields mean "not specified", never an error; a recognized
//! field with an undecodable shape is a
//! [`MalformedParameter`](crate::error::QueryEngineError::MalformedParameter)
//! naming that field.
//!
//! Sort and projection objects are iterated in `serde_json::Map` order;
//! callers that need a guaranteed multi-key order should use the string or
//! array forms.

use bson::Document;
use bson::ser::serialize_to_bson;
use serde_json::{Map, Value};

use crate::descriptor::{Populate, Projection, QueryDescriptor, Sort, SortDirection};
use crate::error::{QueryEngineError, QueryEngineResult};
use crate::pagination::{self, PaginationDefaults};

/// The raw, untrusted parameter map of one request.
pub type RawParams = Map<String, Value>;

/// Normalizes raw request parameters into a [`QueryDescriptor`].
///
/// This is the only way request input becomes a descriptor; both the list
/// and search operations funnel through it, so behavior is identical
/// regardless of transport.
pub fn normalize(params: &RawParams, defaults: &PaginationDefaults) -> QueryEngineResult<QueryDescriptor> {
    let filter = decode_filter(params)?;

    let projection = match aliased(params, "projection", "select") {
        Some((field, value)) => decode_field_set(field, value)?,
        None => Projection::new(),
    };

    let sort = match params.get("sort") {
        Some(value) => decode_sort("sort", value)?,
        None => Vec::new(),
    };

    let populate = match params.get("populate") {
        Some(value) => decode_populate("populate", value)?,
        None => Vec::new(),
    };

    let page = pagination::resolve(params, defaults)?;
    let wants_total_count = decode_total_count(params)?;

    Ok(QueryDescriptor::from_parts(
        filter,
        projection,
        sort,
        populate,
        page.skip,
        page.limit,
        wants_total_count,
    ))
}

/// Resolves an alias pair; the primary name wins when both are present.
fn aliased<'a>(
    params: &'a RawParams,
    primary: &'static str,
    secondary: &'static str,
) -> Option<(&'static str, &'a Value)> {
    match (params.get(primary), params.get(secondary)) {
        (Some(value), _) => Some((primary, value)),
        (None, Some(value)) => Some((secondary, value)),
        (None, None) => None,
    }
}

fn decode_filter(params: &RawParams) -> QueryEngineResult<Document> {
    let (field, value) = match aliased(params, "query", "q") {
        Some(found) => found,
        None => return Ok(Document::new()),
    };

    match value {
        Value::Object(_) => object_to_filter(field, value),
        Value::String(raw) => {
            // Filter strings must decode to the same structural predicate
            // as the object form; a token list is not a predicate.
            let parsed = serde_json::from_str::<Value>(raw)
                .map_err(|e| QueryEngineError::malformed(field, format!("not valid JSON: {e}")))?;
            match parsed {
                Value::Object(_) => object_to_filter(field, &parsed),
                other => Err(QueryEngineError::malformed(
                    field,
                    format!("expected a JSON object, got {}", json_kind(&other)),
                )),
            }
        }
        other => Err(QueryEngineError::malformed(
            field,
            format!("expected an object or JSON string, got {}", json_kind(other)),
        )),
    }
}

fn object_to_filter(field: &str, value: &Value) -> QueryEngineResult<Document> {
    serialize_to_bson(value)
        .map_err(|e| QueryEngineError::malformed(field, e))?
        .as_document()
        .cloned()
        .ok_or_else(|| QueryEngineError::malformed(field, "expected a document"))
}

fn decode_field_set(field: &'static str, value: &Value) -> QueryEngineResult<Projection> {
    let mut projection = Projection::new();

    match value {
        Value::Object(map) => {
            for (name, flag) in map {
                match selection_flag(flag) {
                    Some(true) => projection.push_include(name),
                    Some(false) => projection.push_exclude(name),
                    None => {
                        return Err(QueryEngineError::malformed(
                            field,
                            format!("`{name}` must map to a boolean or 0/1"),
                        ));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(token) => push_field_token(&mut projection, field, token)?,
                    other => {
                        return Err(QueryEngineError::malformed(
                            field,
                            format!("array entries must be strings, got {}", json_kind(other)),
                        ));
                    }
                }
            }
        }
        Value::String(raw) => match parse_embedded_json(raw) {
            Some(parsed) => return decode_field_set(field, &parsed),
            None => {
                for token in tokens(raw) {
                    push_field_token(&mut projection, field, token)?;
                }
            }
        },
        other => {
            return Err(QueryEngineError::malformed(
                field,
                format!("expected an object, string or array, got {}", json_kind(other)),
            ));
        }
    }

    Ok(projection)
}

fn decode_sort(field: &'static str, value: &Value) -> QueryEngineResult<Vec<Sort>> {
    let mut sort = Vec::new();

    match value {
        Value::Object(map) => {
            for (name, direction) in map {
                let direction = sort_direction(direction).ok_or_else(|| {
                    QueryEngineError::malformed(
                        field,
                        format!("`{name}` must map to 1/-1 or asc/desc"),
                    )
                })?;
                sort.push(Sort::new(name, direction));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(token) => sort.push(sort_token(field, token)?),
                    other => {
                        return Err(QueryEngineError::malformed(
                            field,
                            format!("array entries must be strings, got {}", json_kind(other)),
                        ));
                    }
                }
            }
        }
        Value::String(raw) => match parse_embedded_json(raw) {
            Some(parsed) => return decode_sort(field, &parsed),
            None => {
                for token in tokens(raw) {
                    sort.push(sort_token(field, token)?);
                }
            }
        },
        other => {
            return Err(QueryEngineError::malformed(
                field,
                format!("expected an object or string, got {}", json_kind(other)),
            ));
        }
    }

    Ok(sort)
}

fn decode_populate(field: &'static str, value: &Value) -> QueryEngineResult<Vec<Populate>> {
    match value {
        Value::Object(map) => Ok(vec![populate_spec(field, map)?]),
        Value::Array(items) => {
            let mut populate = Vec::new();
            for item in items {
                match item {
                    Value::String(path) => populate.push(Populate::new(path)),
                    Value::Object(map) => populate.push(populate_spec(field, map)?),
                    other => {
                        return Err(QueryEngineError::malformed(
                            field,
                            format!("array entries must be strings or objects, got {}", json_kind(other)),
                        ));
                    }
                }
            }
            Ok(populate)
        }
        Value::String(raw) => match parse_embedded_json(raw) {
            Some(parsed) => decode_populate(field, &parsed),
            None => Ok(tokens(raw).map(Populate::new).collect()),
        },
        other => Err(QueryEngineError::malformed(
            field,
            format!("expected an object, string or array, got {}", json_kind(other)),
        )),
    }
}

fn populate_spec(field: &'static str, map: &Map<String, Value>) -> QueryEngineResult<Populate> {
    let path = map
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| QueryEngineError::malformed(field, "populate object requires a string `path`"))?;

    let mut populate = Populate::new(path);
    if let Some(select) = map.get("select") {
        populate.select = decode_field_set(field, select)?;
    }

    Ok(populate)
}

fn decode_total_count(params: &RawParams) -> QueryEngineResult<bool> {
    match params.get("totalCount") {
        None => Ok(false),
        Some(Value::Bool(wanted)) => Ok(*wanted),
        Some(Value::String(raw)) => match raw.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(QueryEngineError::malformed(
                "totalCount",
                format!("`{other}` is not a boolean"),
            )),
        },
        Some(other) => Err(QueryEngineError::malformed(
            "totalCount",
            format!("expected a boolean, got {}", json_kind(other)),
        )),
    }
}

/// Attempts the JSON branch of a string-typed input. Only objects and
/// arrays count; anything else falls back to token-list parsing.
fn parse_embedded_json(raw: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn push_field_token(projection: &mut Projection, field: &'static str, token: &str) -> QueryEngineResult<()> {
    match token.strip_prefix('-') {
        Some("") => Err(QueryEngineError::malformed(field, "empty field name")),
        Some(name) => {
            projection.push_exclude(name);
            Ok(())
        }
        None => {
            projection.push_include(token);
            Ok(())
        }
    }
}

fn sort_token(field: &'static str, token: &str) -> QueryEngineResult<Sort> {
    match token.strip_prefix('-') {
        Some("") => Err(QueryEngineError::malformed(field, "empty field name")),
        Some(name) => Ok(Sort::new(name, SortDirection::Desc)),
        None => Ok(Sort::new(token, SortDirection::Asc)),
    }
}

fn sort_direction(value: &Value) -> Option<SortDirection> {
    match value {
        Value::Number(number) => {
            let number = number.as_f64()?;
            if number > 0.0 {
                Some(SortDirection::Asc)
            } else if number < 0.0 {
                Some(SortDirection::Desc)
            } else {
                None
            }
        }
        Value::String(raw) => match raw.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(SortDirection::Asc),
            "desc" | "descending" | "-1" => Some(SortDirection::Desc),
            _ => None,
        },
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    fn run(value: Value) -> QueryEngineResult<QueryDescriptor> {
        let params = match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        };
        normalize(&params, &PaginationDefaults::default())
    }

    #[test]
    fn filter_object_and_json_string_normalize_identically() {
        let from_object = run(json!({ "query": { "name": "asd" } })).unwrap();
        let from_string = run(json!({ "query": r#"{"name":"asd"}"# })).unwrap();
        assert_eq!(from_object.filter(), from_string.filter());
        assert_eq!(from_object.filter(), &doc! { "name": "asd" });
    }

    #[test]
    fn query_wins_over_q() {
        let query = run(json!({
            "query": { "name": "asd" },
            "q": { "name": "qwe" },
        }))
        .unwrap();
        assert_eq!(query.filter(), &doc! { "name": "asd" });
    }

    #[test]
    fn q_alias_is_honored_alone() {
        let query = run(json!({ "q": { "age": 3 } })).unwrap();
        assert_eq!(query.filter(), &doc! { "age": 3 });
    }

    #[test]
    fn missing_filter_matches_everything() {
        let query = run(json!({})).unwrap();
        assert!(query.filter().is_empty());
    }

    #[test]
    fn filter_string_must_be_json() {
        let err = run(json!({ "query": "name asd" })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "query"));
    }

    #[test]
    fn filter_string_must_be_a_json_object() {
        let err = run(json!({ "q": "[1, 2]" })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "q"));
    }

    #[test]
    fn filter_rejects_non_object_shapes() {
        let err = run(json!({ "query": 42 })).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn projection_token_string() {
        let query = run(json!({ "projection": "name -_id" })).unwrap();
        assert_eq!(query.projection().include(), ["name"]);
        assert_eq!(query.projection().exclude(), ["_id"]);
    }

    #[test]
    fn projection_comma_delimited_string() {
        let query = run(json!({ "projection": "name,age,-_id" })).unwrap();
        assert_eq!(query.projection().include(), ["name", "age"]);
        assert_eq!(query.projection().exclude(), ["_id"]);
    }

    #[test]
    fn projection_object_form() {
        let query = run(json!({ "projection": { "name": 1, "_id": 0 } })).unwrap();
        assert_eq!(query.projection().include(), ["name"]);
        assert_eq!(query.projection().exclude(), ["_id"]);
    }

    #[test]
    fn projection_array_form() {
        let query = run(json!({ "projection": ["name", "-_id"] })).unwrap();
        assert_eq!(query.projection().include(), ["name"]);
        assert_eq!(query.projection().exclude(), ["_id"]);
    }

    #[test]
    fn projection_json_string_form() {
        let query = run(json!({ "projection": r#"{"name":true,"_id":false}"# })).unwrap();
        assert_eq!(query.projection().include(), ["name"]);
        assert_eq!(query.projection().exclude(), ["_id"]);
    }

    #[test]
    fn projection_wins_over_select() {
        let query = run(json!({ "projection": "name", "select": "age" })).unwrap();
        assert_eq!(query.projection().include(), ["name"]);
    }

    #[test]
    fn select_alias_is_honored_alone() {
        let query = run(json!({ "select": "-secret" })).unwrap();
        assert_eq!(query.projection().exclude(), ["secret"]);
    }

    #[test]
    fn projection_object_rejects_non_flag_values() {
        let err = run(json!({ "projection": { "name": "yes" } })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "projection"));
    }

    #[test]
    fn bare_dash_token_is_malformed() {
        let err = run(json!({ "projection": "name -" })).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn sort_string_tokens() {
        let query = run(json!({ "sort": "name -age" })).unwrap();
        assert_eq!(
            query.sort(),
            [
                Sort::new("name", SortDirection::Asc),
                Sort::new("age", SortDirection::Desc),
            ]
        );
    }

    #[test]
    fn sort_object_numeric_directions() {
        let query = run(json!({ "sort": { "name": 1, "age": -1 } })).unwrap();
        assert!(query.sort().contains(&Sort::new("name", SortDirection::Asc)));
        assert!(query.sort().contains(&Sort::new("age", SortDirection::Desc)));
    }

    #[test]
    fn sort_object_string_directions() {
        let query = run(json!({ "sort": { "name": "desc" } })).unwrap();
        assert_eq!(query.sort(), [Sort::new("name", SortDirection::Desc)]);
    }

    #[test]
    fn sort_object_rejects_zero_direction() {
        let err = run(json!({ "sort": { "name": 0 } })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "sort"));
    }

    #[test]
    fn populate_single_token() {
        let query = run(json!({ "populate": "cats" })).unwrap();
        assert_eq!(query.populate(), [Populate::new("cats")]);
    }

    #[test]
    fn populate_token_list() {
        let query = run(json!({ "populate": "cats dogs" })).unwrap();
        assert_eq!(query.populate().len(), 2);
        assert_eq!(query.populate()[1].path, "dogs");
    }

    #[test]
    fn populate_object_with_select() {
        let query = run(json!({ "populate": { "path": "cats", "select": "name -_id" } })).unwrap();
        assert_eq!(query.populate().len(), 1);
        assert_eq!(query.populate()[0].path, "cats");
        assert_eq!(query.populate()[0].select.include(), ["name"]);
        assert_eq!(query.populate()[0].select.exclude(), ["_id"]);
    }

    #[test]
    fn populate_array_of_mixed_entries() {
        let query = run(json!({ "populate": ["cats", { "path": "owner" }] })).unwrap();
        assert_eq!(query.populate()[0].path, "cats");
        assert_eq!(query.populate()[1].path, "owner");
    }

    #[test]
    fn populate_json_string_form() {
        let query = run(json!({ "populate": r#"{"path":"cats"}"# })).unwrap();
        assert_eq!(query.populate(), [Populate::new("cats")]);
    }

    #[test]
    fn populate_object_without_path_is_malformed() {
        let err = run(json!({ "populate": { "select": "name" } })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "populate"));
    }

    #[test]
    fn total_count_boolean_and_string_spellings() {
        assert!(run(json!({ "totalCount": true })).unwrap().wants_total_count());
        assert!(run(json!({ "totalCount": "true" })).unwrap().wants_total_count());
        assert!(!run(json!({ "totalCount": "0" })).unwrap().wants_total_count());
        assert!(!run(json!({})).unwrap().wants_total_count());
    }

    #[test]
    fn total_count_rejects_other_values() {
        let err = run(json!({ "totalCount": "yes" })).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "totalCount"));
    }

    #[test]
    fn pagination_flows_into_the_descriptor() {
        let query = run(json!({ "page": 2, "pageSize": 5 })).unwrap();
        assert_eq!(query.skip(), 5);
        assert_eq!(query.limit(), Some(5));
    }

    #[test]
    fn query_string_shaped_params_normalize_like_body_params() {
        // Query-string transports deliver every value as a string.
        let from_strings = run(json!({
            "query": r#"{"name":"asd"}"#,
            "sort": "-name",
            "skip": "1",
            "limit": "5",
            "totalCount": "true",
        }))
        .unwrap();
        let from_body = run(json!({
            "query": { "name": "asd" },
            "sort": "-name",
            "skip": 1,
            "limit": 5,
            "totalCount": true,
        }))
        .unwrap();
        assert_eq!(from_strings, from_body);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let query = run(json!({ "warp": 9, "query": { "a": 1 } })).unwrap();
        assert_eq!(query.filter(), &doc! { "a": 1 });
    }
}
