use serde::{Deserialize, Serialize};

use super::common::{
    deserialize_id, deserialize_string_bool, deserialize_string_or_number, Envelope, PaginationMeta,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A customer (end user of the mobile app).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_bool")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub vehicle_count: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Customer {
    pub fn vehicle_count(&self) -> u32 {
        self.vehicle_count
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCollection {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type CustomersResponse = Envelope<CustomerCollection>;

/// Payload for editing a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: String,
    pub phone_number: Option<String>,
    pub gender: Gender,
    pub is_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_customers_with_string_flags() {
        let json = r#"{"success": true, "message": "ok", "data": {"customers": [
            {"id": "c-1", "name": "Huda", "phone_number": "0551234567", "gender": "female",
             "is_verified": "1", "vehicle_count": "2", "avatar_url": ""},
            {"id": 7, "name": "Fahad", "is_verified": false, "vehicle_count": 0}],
            "meta": {"total": "2"}}}"#;

        let resp: CustomersResponse =

            serde_json::from_str(json).expect("Failed to parse customers JSON");
        let customers = &resp.data.customers;
        assert!(customers[0].is_verified);
        assert_eq!(customers[0].vehicle_count(), 2);
        assert_eq!(customers[1].id, "7");
        assert!(!customers[1].is_verified);
        assert_eq!(customers[1].vehicle_count(), 0);
    }

    #[test]
    fn test_customer_update_serializes_gender_lowercase() {
        let update = CustomerUpdate {
            name: "Huda".into(),
            phone_number: None,
            gender: Gender::Female,
            is_verified: true,
        };
        let value = serde_json::to_value(&update).expect("serialize");
        assert_eq!(value["gender"], "female");
    }
}
