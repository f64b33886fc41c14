use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::models::Listing;

/// Parse stored or received text into a listing collection.
///
/// Never fails: unparsable text or anything other than a JSON array yields an
/// empty collection.
pub fn parse_collection(raw: &str) -> Vec<Listing> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => decode_collection(value),
        Err(e) => {
            warn!("Discarding unparsable listing collection: {}", e);
            Vec::new()
        }
    }
}

/// Decode a JSON value into listings.
///
/// Elements that do not decode are dropped, and only the first listing of
/// each id is kept.
pub fn decode_collection(value: Value) -> Vec<Listing> {
    let Value::Array(items) = value else {
        warn!("Listing collection is not an array, using an empty collection");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut listings = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Listing>(item) {
            Ok(listing) => {
                if seen.insert(listing.id.clone()) {
                    listings.push(listing);
                } else {
                    warn!("Dropping duplicate listing id {}", listing.id);
                }
            }
            Err(e) => warn!("Dropping malformed listing at index {}: {}", index, e),
        }
    }
    listings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str) -> Value {
        json!({
            "id": id,
            "breed": "Jersey",
            "age": 3,
            "milkYield": 12,
            "price": 45000,
            "district": "Salem",
            "createdAt": 0,
            "expiresAt": 1
        })
    }

    #[test]
    fn not_json_yields_empty() {
        assert!(parse_collection("not json").is_empty());
        assert!(parse_collection("").is_empty());
    }

    #[test]
    fn non_array_yields_empty() {
        assert!(parse_collection(r#"{"id":"x"}"#).is_empty());
        assert!(parse_collection("null").is_empty());
        assert!(parse_collection("42").is_empty());
    }

    #[test]
    fn drops_bad_elements_and_duplicates() {
        let value = json!([record("a"), {"id": "broken"}, record("b"), record("a"), "text"]);
        let listings = decode_collection(value);
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
