//! Product record types and the field selectors used by filters and summaries.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// One product listing. Every field is optional: an absent key and an
/// explicit `null` both load as `None`. Scrape metadata (`availability`,
/// `images`, `scraped_at`) is ignored at load time. Dataset loading goes
/// through [`ProductRecord::from_json_value`], which falls back to `url`
/// for a missing `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_details: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub reviews_count: Option<f64>,
    /// Slash-delimited hierarchy, e.g. `Art & Collectibles / Painting`.
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductRecord {
    /// Decode one raw dataset record. A record without an `id` takes its
    /// listing `url` as identifier.
    pub fn from_json_value(mut value: serde_json::Value) -> serde_json::Result<Self> {
        if let Some(object) = value.as_object_mut() {
            let has_id = object.get("id").is_some_and(|v| !v.is_null());
            if !has_id {
                if let Some(url) = object.remove("url") {
                    object.insert("id".to_string(), url);
                }
            }
        }
        serde_json::from_value(value)
    }
}

/// Free-text fields a segment predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Description,
    ProductDetails,
}

impl TextField {
    pub fn value<'a>(&self, record: &'a ProductRecord) -> Option<&'a str> {
        match self {
            TextField::Description => record.description.as_deref(),
            TextField::ProductDetails => record.product_details.as_deref(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextField::Description => "description",
            TextField::ProductDetails => "product_details",
        }
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Price,
    AverageRating,
    ReviewsCount,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::Price,
        NumericField::AverageRating,
        NumericField::ReviewsCount,
    ];

    pub fn value(&self, record: &ProductRecord) -> Option<f64> {
        match self {
            NumericField::Price => record.price,
            NumericField::AverageRating => record.average_rating,
            NumericField::ReviewsCount => record.reviews_count,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Price => "price",
            NumericField::AverageRating => "average_rating",
            NumericField::ReviewsCount => "reviews_count",
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every analysed column, in dataset order. Used for null counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Id,
    Description,
    ProductDetails,
    Brand,
    Price,
    AverageRating,
    ReviewsCount,
    Category,
}

impl ProductField {
    pub const ALL: [ProductField; 8] = [
        ProductField::Id,
        ProductField::Description,
        ProductField::ProductDetails,
        ProductField::Brand,
        ProductField::Price,
        ProductField::AverageRating,
        ProductField::ReviewsCount,
        ProductField::Category,
    ];

    pub fn is_null(&self, record: &ProductRecord) -> bool {
        match self {
            ProductField::Id => record.id.is_none(),
            ProductField::Description => record.description.is_none(),
            ProductField::ProductDetails => record.product_details.is_none(),
            ProductField::Brand => record.brand.is_none(),
            ProductField::Price => record.price.is_none(),
            ProductField::AverageRating => record.average_rating.is_none(),
            ProductField::ReviewsCount => record.reviews_count.is_none(),
            ProductField::Category => record.category.is_none(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Description => "description",
            ProductField::ProductDetails => "product_details",
            ProductField::Brand => "brand",
            ProductField::Price => "price",
            ProductField::AverageRating => "average_rating",
            ProductField::ReviewsCount => "reviews_count",
            ProductField::Category => "category",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Scraped exports mix JSON numbers and numeric strings in the same column.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            strip_thousands_separators(trimmed)
                .and_then(|digits| digits.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a number, found {s:?}")))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, found {other}"
        ))),
    }
}

/// `1,023.50` → `1023.50`. Commas are only accepted as thousands
/// separators in the integer part; `12,50` is `None`.
fn strip_thousands_separators(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let unsigned = s.trim_start_matches(['+', '-']);
    let sign = &s[..s.len() - unsigned.len()];
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = integer.split(',');
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut out = format!("{sign}{first}");
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out.push_str(group);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    Some(out)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string identifier, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_null_fields_load_as_none() {
        let record: ProductRecord =
            serde_json::from_str(r#"{"id": "1", "brand": null, "price": 12.5}"#).unwrap();
        assert_eq!(record.id.as_deref(), Some("1"));
        assert!(record.brand.is_none());
        assert!(record.description.is_none());
        assert_eq!(record.price, Some(12.5));
    }

    #[test]
    fn test_numeric_strings_and_numeric_ids() {
        let record: ProductRecord = serde_json::from_str(
            r#"{"id": 666501658, "price": "1,023.50", "average_rating": " 4.5 ", "reviews_count": ""}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("666501658"));
        assert_eq!(record.price, Some(1023.5));
        assert_eq!(record.average_rating, Some(4.5));
        assert_eq!(record.reviews_count, None);
    }

    #[test]
    fn test_decimal_comma_is_rejected() {
        for bad in ["12,50", "1,0234.5", ",123", "1,023,4", "1.023,50"] {
            let json = format!(r#"{{"price": "{bad}"}}"#);
            let result: Result<ProductRecord, _> = serde_json::from_str(&json);
            assert!(result.is_err(), "{bad} should be rejected");
        }
        let record: ProductRecord =
            serde_json::from_str(r#"{"price": "-12,345,678.9"}"#).unwrap();
        assert_eq!(record.price, Some(-12_345_678.9));
    }

    #[test]
    fn test_url_stands_in_for_missing_id() {
        let url = "https://www.etsy.com/listing/666501658/x";
        let record =
            ProductRecord::from_json_value(serde_json::json!({ "url": url, "price": 5.0 }))
                .unwrap();
        assert_eq!(record.id.as_deref(), Some(url));

        let record =
            ProductRecord::from_json_value(serde_json::json!({ "id": null, "url": url }))
                .unwrap();
        assert_eq!(record.id.as_deref(), Some(url));

        let record =
            ProductRecord::from_json_value(serde_json::json!({ "id": "666501658", "url": url }))
                .unwrap();
        assert_eq!(record.id.as_deref(), Some("666501658"));

        let record = ProductRecord::from_json_value(serde_json::json!({ "brand": "Inkwell" }))
            .unwrap();
        assert!(record.id.is_none());
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let result: Result<ProductRecord, _> =
            serde_json::from_str(r#"{"price": "twelve dollars"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_excluded_scrape_fields_are_ignored() {
        let record: ProductRecord = serde_json::from_str(
            r#"{"id": "a", "availability": "in stock", "images": ["x.jpg"], "scraped_at": "2021-06-01"}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("a"));
    }

    #[test]
    fn test_field_accessors() {
        let record = ProductRecord {
            description: Some("Gift".into()),
            average_rating: Some(4.0),
            ..Default::default()
        };
        assert_eq!(TextField::Description.value(&record), Some("Gift"));
        assert_eq!(TextField::ProductDetails.value(&record), None);
        assert_eq!(NumericField::AverageRating.value(&record), Some(4.0));
        assert!(ProductField::Brand.is_null(&record));
        assert!(!ProductField::Description.is_null(&record));
    }
}
