use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Property listing as served by the marketplace backend.
///
/// Read-only from the listings page's point of view: everything here comes
/// from `GET /api/properties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: i64,
    pub locality: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub bedrooms: Option<u32>,
    #[serde(deserialize_with = "lenient_count")]
    pub bathrooms: Option<u32>,
    /// Built-up area in square feet
    pub built_up_area: Option<f64>,
    pub property_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub transaction_type: Option<String>,
    pub seller_type: Option<String>,
    pub seller_id: Option<String>,
    pub project_stage: Option<String>,
    /// Age in years; the backend sends either a string or a number
    #[serde(deserialize_with = "optional_string_or_number")]
    pub age_of_property: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_featured: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_verified: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Admin-defined fields, keyed by field key
    #[serde(deserialize_with = "null_as_default")]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
}

impl Property {
    /// Location fields searched by the locality filter
    pub fn location_fields(&self) -> impl Iterator<Item = &str> {
        [&self.locality, &self.area, &self.city]
            .into_iter()
            .filter_map(|field| field.as_deref())
    }
}

// Listing rows are typed loosely by the backend: numbers arrive as strings,
// and any field may be null. None of that should drop the row.

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_string_or_number(deserializer).map(Option::unwrap_or_default)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Number, numeric string ("8500000.00", "85,00,000") or null
fn lenient_price<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number).map_or(0, |n| n.round() as i64))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number)
        .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
        _ => false,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_payload() {
        let property: Property = serde_json::from_value(json!({
            "id": "p1",
            "title": "2 BHK in Indiranagar",
            "price": 8500000,
            "locality": "Indiranagar",
            "city": "Bengaluru",
            "bedrooms": 2,
            "transactionType": "sale",
            "sellerType": "Owner",
            "ageOfProperty": 3,
            "isFeatured": true,
            "createdAt": "2024-05-01T10:00:00Z",
            "customFields": { "floor": "4" }
        }))
        .unwrap();

        assert_eq!(property.price, 8_500_000);
        assert_eq!(property.bedrooms, Some(2));
        assert_eq!(property.age_of_property.as_deref(), Some("3"));
        assert!(property.is_featured);
        assert!(!property.is_verified);
        assert_eq!(property.custom_fields["floor"], json!("4"));
    }

    #[test]
    fn age_accepts_string_and_null() {
        let with_string: Property =
            serde_json::from_value(json!({ "id": "a", "ageOfProperty": "7" })).unwrap();
        let with_null: Property =
            serde_json::from_value(json!({ "id": "b", "ageOfProperty": null })).unwrap();

        assert_eq!(with_string.age_of_property.as_deref(), Some("7"));
        assert_eq!(with_null.age_of_property, None);
    }

    #[test]
    fn location_fields_skip_missing() {
        let property = Property {
            locality: Some("Baner".into()),
            city: Some("Pune".into()),
            ..Default::default()
        };

        let fields: Vec<_> = property.location_fields().collect();
        assert_eq!(fields, vec!["Baner", "Pune"]);
    }

    #[test]
    fn loose_rows_still_decode() {
        let rows: Vec<Property> = serde_json::from_value(json!([
            { "id": "a", "price": null, "isFeatured": null, "title": null },
            { "id": "b", "price": "8500000.00", "bedrooms": "3", "isVerified": "true" },
            { "id": 7, "price": "85,00,000", "createdAt": "last week", "customFields": null },
            { "id": "d", "price": 100 }
        ]))
        .unwrap();

        assert_eq!(rows[0].price, 0);
        assert!(!rows[0].is_featured);
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[1].price, 8_500_000);
        assert_eq!(rows[1].bedrooms, Some(3));
        assert!(rows[1].is_verified);
        assert_eq!(rows[2].id, "7");
        assert_eq!(rows[2].price, 8_500_000);
        assert_eq!(rows[2].created_at, None);
        assert!(rows[2].custom_fields.is_empty());
        assert_eq!(rows[3].price, 100);
    }
}
