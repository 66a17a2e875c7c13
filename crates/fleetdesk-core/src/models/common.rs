use serde::{Deserialize, Deserializer, Serialize};

/// Every backend response is wrapped as `{success, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<D> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: D,
}

/// Pagination block returned alongside paged collections.
/// Note: API returns page numbers and totals as strings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub current_page: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub last_page: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub per_page: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub total: Option<String>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
}

impl PaginationMeta {
    fn parse(value: &Option<String>) -> Option<u64> {
        value.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn total(&self) -> Option<u64> {
        Self::parse(&self.total)
    }

    pub fn current_page(&self) -> Option<u64> {
        Self::parse(&self.current_page)
    }

    pub fn last_page(&self) -> Option<u64> {
        Self::parse(&self.last_page)
    }

    pub fn has_next(&self) -> bool {
        self.next_page_url.is_some()
    }

    /// "page 2 of 7 (130 total)"
    pub fn summary(&self) -> String {
        match (self.current_page(), self.last_page(), self.total()) {
            (Some(cur), Some(last), Some(total)) => {
                format!("page {} of {} ({} total)", cur, last, total)
            }
            (_, _, Some(total)) => format!("{} total", total),
            _ => "unpaged".to_string(),
        }
    }
}

/// A `{id, name}` pair, used for roles, permissions and workshop services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

// Helper to deserialize "true"/"1"/"yes" strings, numbers or actual bools
pub(crate) fn deserialize_string_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct BoolVisitor;

    impl<'de> de::Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean, 0/1, or a string such as 'true'/'false'")
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(false)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

// Helper to deserialize string or number as Option<String>
pub(crate) fn deserialize_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

/// Ids come back as numbers for most resources and as strings for admins
/// and customers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_string_or_number(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("missing id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_accepts_strings_and_numbers() {
        let meta: PaginationMeta = serde_json::from_str(
            r#"{"current_page": "2", "last_page": 7, "per_page": "20", "total": 130,
                "next_page_url": "https://x/api?page=3", "prev_page_url": null}"#,
        )
        .expect("meta should parse");
        assert_eq!(meta.current_page(), Some(2));
        assert_eq!(meta.total(), Some(130));
        assert!(meta.has_next());
        assert_eq!(meta.summary(), "page 2 of 7 (130 total)");
    }

    #[test]
    fn test_meta_missing_fields() {
        let meta: PaginationMeta = serde_json::from_str("{}").expect("empty meta should parse");
        assert_eq!(meta.summary(), "unpaged");
        assert!(!meta.has_next());
    }

    #[test]
    fn test_named_ref_numeric_or_string_id() {
        let a: NamedRef =
            serde_json::from_str(r#"{"id": 3, "name": "Oil change"}"#).expect("parse");
        let b: NamedRef =
            serde_json::from_str(r#"{"id": "3", "name": "Oil change"}"#).expect("parse");
        assert_eq!(a, b);
    }
}
