use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    deserialize_string_bool, deserialize_string_or_number, Envelope, NamedRef, PaginationMeta,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopVendor {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_bool")]
    pub is_vendor_account_approved: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHours {
    pub id: i64,
    pub day_of_week: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_bool")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workshop {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Either plain text or a map of locale to text
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_bool")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub rating: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub services: Vec<NamedRef>,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub vendor: Option<WorkshopVendor>,
}

impl Workshop {
    /// English description, falling back to the first localized text.
    pub fn description_text(&self) -> String {
        match &self.description {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("en")
                .or_else(|| map.values().next())
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        }
    }

    pub fn rating(&self) -> Option<f64> {
        self.rating.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn open_days(&self) -> usize {
        self.working_hours.iter().filter(|h| h.enabled).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopCollection {
    #[serde(default)]
    pub workshops: Vec<Workshop>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type WorkshopsResponse = Envelope<WorkshopCollection>;

#[cfg(test)]
mod tests {
    use super::*;

    const WORKSHOPS_JSON: &str = r#"{"success": true, "message": "ok", "data": {"workshops": [
        {"id": 1, "name": "Quick Fix", "description": {"en": "Brakes and tyres", "ar": "فرامل"},
         "city": "Riyadh", "latitude": "24.7", "longitude": 46.6, "is_active": true, "rating": "4.5",
         "services": [{"id": 2, "name": "Brakes"}],
         "working_hours": [
            {"id": 1, "day_of_week": "sunday", "start_time": "08:00", "end_time": "17:00", "enabled": true},
            {"id": 2, "day_of_week": "friday", "start_time": null, "end_time": null, "enabled": false}]},
        {"id": 2, "name": "Garage 2", "description": "Body work", "is_active": "0"}]}}"#;

    #[test]
    fn test_parse_workshops() {
        let resp: WorkshopsResponse =
            serde_json::from_str(WORKSHOPS_JSON).expect("Failed to parse workshops JSON");
        let first = &resp.data.workshops[0];
        assert_eq!(first.description_text(), "Brakes and tyres");
        assert_eq!(first.rating(), Some(4.5));
        assert_eq!(first.longitude.as_deref(), Some("46.6"));
        assert_eq!(first.open_days(), 1);

        let second = &resp.data.workshops[1];
        assert_eq!(second.description_text(), "Body work");
        assert!(!second.is_active);
        assert!(second.rating().is_none());
    }
}
