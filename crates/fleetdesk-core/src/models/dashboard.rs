use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{deserialize_string_or_number, Envelope, PaginationMeta};

/// Dashboard counters. The backend adds keys over time, so they are kept
/// as a map and read by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics(pub Map<String, Value>);

impl Statistics {
    pub fn count(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric counters in key order.
    pub fn counters(&self) -> Vec<(&str, i64)> {
        let mut counters: Vec<(&str, i64)> = self
            .0
            .keys()
            .filter_map(|k| self.count(k).map(|v| (k.as_str(), v)))
            .collect();
        counters.sort_by(|a, b| a.0.cmp(b.0));
        counters
    }
}

pub type StatisticsResponse = Envelope<Statistics>;

/// One service entry in the maintenance log feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: i64,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub service_date: Option<String>,
    #[serde(default)]
    pub vehicle_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub workshop_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub cost: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceLogCollection {
    #[serde(default, alias = "logs")]
    pub maintenance_logs: Vec<MaintenanceLog>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type MaintenanceLogsResponse = Envelope<MaintenanceLogCollection>;
