use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields a product must carry (and carry a truthy value for) to be accepted.
pub const REQUIRED_PRODUCT_FIELDS: [&str; 5] = ["name", "description", "price", "brand", "category"];

/// A catalog entry as stored in the document index.
///
/// The record is kept as a raw JSON object so it round-trips verbatim; only
/// `name` is ever read by the search path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Product(Map<String, Value>);

impl Product {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Required fields that are absent or hold a falsy value
    /// (`null`, `false`, `0`, `""`), in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_PRODUCT_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.get(field).is_some_and(is_truthy))
            .collect()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One hit as returned by the index, in the engine's envelope format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Product,
}

/// A page of hits plus the total number of matching documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(value: Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_fields_lists_absent_and_falsy() {
        let p = product(json!({
            "name": "iPhone 13",
            "description": "",
            "price": 0,
            "brand": null,
        }));
        assert_eq!(
            p.missing_fields(),
            vec!["description", "price", "brand", "category"]
        );
    }

    #[test]
    fn test_complete_product_has_no_missing_fields() {
        let p = product(json!({
            "name": "Dell XPS 13",
            "description": "Compact and powerful laptop for everyday use.",
            "price": 1399,
            "brand": "Dell",
            "category": "Laptops",
            "stock": 40,
        }));
        assert!(p.missing_fields().is_empty());
        assert_eq!(p.name(), Some("Dell XPS 13"));
    }

    #[test]
    fn test_product_serializes_verbatim() {
        let raw = json!({
            "name": "Sony WH-1000XM5",
            "price": 399,
            "specifications": [{ "name": "Battery Life", "value": "30 hours" }],
        });
        let p = product(raw.clone());
        assert_eq!(serde_json::to_value(&p).unwrap(), raw);
    }

    #[test]
    fn test_hit_envelope_field_names() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_index": "products",
            "_id": "abc",
            "_score": 1.5,
            "_source": { "name": "iPhone 13" },
        }))
        .unwrap();
        assert_eq!(hit.id, "abc");
        assert_eq!(hit.score, Some(1.5));
        assert_eq!(hit.source.name(), Some("iPhone 13"));
    }
}
