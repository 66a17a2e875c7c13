use serde::{Deserialize, Serialize};

use super::common::{deserialize_string_or_number, Envelope, PaginationMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleOwner {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One maintenance visit recorded against a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: i64,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub service_date: Option<String>,
    #[serde(default)]
    pub maintenance_time: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub cost: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub make_brand: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub model_year: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub vin_number: Option<String>,
    #[serde(default)]
    pub chassis_number: Option<String>,
    #[serde(default)]
    pub owner: Option<VehicleOwner>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
}

impl Vehicle {
    /// "Toyota Camry (2021)"
    pub fn display_name(&self) -> String {
        let mut name = match self.make_brand.as_deref() {
            Some(make) if !make.is_empty() => format!("{} {}", make, self.name),
            _ => self.name.clone(),
        };
        if let Some(ref year) = self.model_year {
            name.push_str(&format!(" ({})", year));
        }
        name
    }

    pub fn owner_name(&self) -> &str {
        self.owner.as_ref().map(|o| o.name.as_str()).unwrap_or("-")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCollection {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type VehiclesResponse = Envelope<VehicleCollection>;

/// Payload for editing a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VehicleUpdate {
    pub user_id: i64,
    pub name: String,
    pub make_brand: String,
    pub model_year: Option<String>,
    pub vin_number: Option<String>,
    pub chassis_number: Option<String>,
    pub mileage: Option<i64>,
    pub vehicle_type: Option<String>,
    pub plate_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vehicles_response() {
        let json = r#"{"success": true, "message": "ok", "data": {
            "vehicles": [{"id": 12, "name": "Camry", "make_brand": "Toyota", "model_year": 2021,
                          "mileage": 42000, "plate_number": "ABC 123",
                          "owner": {"id": 3, "name": "Omar", "email": "o@example.com", "phone": "055"},
                          "services": [{"id": 1, "service_type": "Oil change", "cost": "150.00"}]}],
            "meta": {"current_page": "1", "last_page": "1", "per_page": "15", "total": "1",
                     "next_page_url": null, "prev_page_url": null}}}"#;

        let resp: VehiclesResponse =

            serde_json::from_str(json).expect("Failed to parse vehicles JSON");
        let vehicle = &resp.data.vehicles[0];
        assert_eq!(vehicle.display_name(), "Toyota Camry (2021)");
        assert_eq!(vehicle.owner_name(), "Omar");
        assert_eq!(vehicle.services[0].cost.as_deref(), Some("150.00"));
        assert_eq!(resp.data.meta.total(), Some(1));
    }
}
