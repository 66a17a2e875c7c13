//! One cached client per admin collection, wired together.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::api::{decode, ApiError, HttpRequest, HttpUpload, Transport};
use crate::cache::{CacheStatus, ListDefaults, Sort};
use crate::models::{
    Admin, AdminsResponse, CustomersResponse, Envelope, MaintenanceLogsResponse, NamedRef,
    OfferImage, OfferRequest, PermissionsResponse, ProfileResponse, Role, RolesResponse,
    SocialLinksResponse, StaticContent, StatisticsResponse, SupportRequestsResponse,
    VehiclesResponse, WorkshopsResponse,
};
use crate::resource::{ClientOptions, ResourceClient};

// ============================================================================
// Endpoint paths (relative to the API base URL)
// ============================================================================

pub const ADMINS_PATH: &str = "admins";
pub const VEHICLES_PATH: &str = "admins/vehicles";
pub const CUSTOMERS_PATH: &str = "admins/customers";
pub const SUPPORT_REQUESTS_PATH: &str = "admins/support-requests";
pub const WORKSHOPS_PATH: &str = "customer/workshops";
pub const SOCIAL_LINKS_PATH: &str = "content/social-media-links";
pub const STATISTICS_PATH: &str = "admins/dashboard/statistics";
pub const MAINTENANCE_LOGS_PATH: &str = "admins/dashboard/maintenance-logs";
pub const MONTHLY_MAINTENANCE_PATH: &str = "admins/dashboard/monthly-maintenance-count";
pub const ROLES_PATH: &str = "admins/roles";
pub const PERMISSIONS_PATH: &str = "admins/permissions";
pub const PROFILE_PATH: &str = "admins/profile";
pub const STATIC_CONTENT_PATH: &str = "content/static-content";
pub const OFFERS_PATH: &str = "admins/offers";

/// Cache state of one collection, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReportRow {
    pub resource: String,
    pub path: String,
    #[serde(flatten)]
    pub status: CacheStatus,
}

/// The admin console's data layer.
///
/// Vehicle, customer and support-request writes change what the dashboard
/// shows, so they also clear `statistics` and `maintenance_logs`.
pub struct Console {
    transport: Arc<dyn Transport>,
    pub admins: ResourceClient<AdminsResponse>,
    pub vehicles: ResourceClient<VehiclesResponse>,
    pub customers: ResourceClient<CustomersResponse>,
    pub support_requests: ResourceClient<SupportRequestsResponse>,
    pub workshops: ResourceClient<WorkshopsResponse>,
    pub social_links: ResourceClient<SocialLinksResponse>,
    pub statistics: ResourceClient<StatisticsResponse>,
    pub maintenance_logs: ResourceClient<MaintenanceLogsResponse>,
}

impl Console {
    pub fn new(transport: Arc<dyn Transport>, options: &ClientOptions) -> Self {
        let statistics = ResourceClient::new(
            "statistics",
            STATISTICS_PATH,
            ListDefaults::none(),
            transport.clone(),
            options,
        );
        let maintenance_logs = ResourceClient::new(
            "maintenance_logs",
            MAINTENANCE_LOGS_PATH,
            ListDefaults::none()
                .per_page(10)
                .sort(Sort::desc("service_date")),
            transport.clone(),
            options,
        );

        let mut vehicles = ResourceClient::new(
            "vehicles",
            VEHICLES_PATH,
            ListDefaults::none().sort(Sort::desc("created_at")),
            transport.clone(),
            options,
        );
        let mut customers = ResourceClient::new(
            "customers",
            CUSTOMERS_PATH,
            ListDefaults::none().per_page(0),
            transport.clone(),
            options,
        );
        let mut support_requests = ResourceClient::new(
            "support_requests",
            SUPPORT_REQUESTS_PATH,
            ListDefaults::none().per_page(0),
            transport.clone(),
            options,
        );

        vehicles.also_invalidates(statistics.cache_handle());
        vehicles.also_invalidates(maintenance_logs.cache_handle());
        customers.also_invalidates(statistics.cache_handle());
        customers.also_invalidates(maintenance_logs.cache_handle());
        support_requests.also_invalidates(statistics.cache_handle());
        support_requests.also_invalidates(maintenance_logs.cache_handle());

        let admins = ResourceClient::new(
            "admins",
            ADMINS_PATH,
            ListDefaults::none(),
            transport.clone(),
            options,
        );
        let workshops = ResourceClient::new(
            "workshops",
            WORKSHOPS_PATH,
            ListDefaults::none(),
            transport.clone(),
            options,
        );
        let social_links = ResourceClient::new(
            "social_links",
            SOCIAL_LINKS_PATH,
            ListDefaults::none().per_page(0),
            transport.clone(),
            options,
        );

        Self {
            transport,
            admins,
            vehicles,
            customers,
            support_requests,
            workshops,
            social_links,
            statistics,
            maintenance_logs,
        }
    }

    // ========================================================================
    // Pass-through calls (never cached)
    // ========================================================================

    pub async fn roles(&self) -> Result<Vec<Role>, ApiError> {
        let response: RolesResponse = self.send(HttpRequest::get(ROLES_PATH)).await?;
        Ok(response.data.roles)
    }

    pub async fn permissions(&self) -> Result<Vec<NamedRef>, ApiError> {
        let response: PermissionsResponse = self.send(HttpRequest::get(PERMISSIONS_PATH)).await?;
        Ok(response.data.permissions)
    }

    /// Services per month for the last `months` months, as the chart data
    /// the backend returns.
    pub async fn monthly_maintenance_count(&self, months: u32) -> Result<Value, ApiError> {
        let request = HttpRequest::get(MONTHLY_MAINTENANCE_PATH)
            .with_query(vec![("months".to_string(), months.to_string())]);
        let response: Envelope<Value> = self.send(request).await?;
        Ok(response.data)
    }

    /// The signed-in admin, including effective permissions.
    pub async fn profile(&self) -> Result<Admin, ApiError> {
        let response: ProfileResponse = self.send(HttpRequest::get(PROFILE_PATH)).await?;
        Ok(response.data.admin)
    }

    pub async fn publish_static_content(&self, content: &StaticContent) -> Result<Value, ApiError> {
        self.send(HttpRequest::post(STATIC_CONTENT_PATH, content)?).await
    }

    /// Create a promotional offer with its banner image. Offers have no
    /// cached listing, so nothing is invalidated.
    pub async fn create_offer(
        &self,
        offer: &OfferRequest,
        image: OfferImage,
    ) -> Result<Value, ApiError> {
        let upload = HttpUpload::new(OFFERS_PATH, offer.form_fields()).with_file(image.into_part());
        decode(self.transport.upload(upload).await?)
    }

    async fn send<R: serde::de::DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<R, ApiError> {
        decode(self.transport.call(request).await?)
    }

    // ========================================================================
    // Cache management
    // ========================================================================

    /// Canonical-entry status of every collection.
    pub fn cache_report(&self) -> Vec<CacheReportRow> {
        fn row<T>(client: &ResourceClient<T>) -> CacheReportRow
        where
            T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
        {
            CacheReportRow {
                resource: client.name().to_string(),
                path: client.path().to_string(),
                status: client.cache_status(),
            }
        }

        vec![
            row(&self.admins),
            row(&self.vehicles),
            row(&self.customers),
            row(&self.support_requests),
            row(&self.workshops),
            row(&self.social_links),
            row(&self.statistics),
            row(&self.maintenance_logs),
        ]
    }

    /// Clear every collection's cache.
    pub fn clear_all(&self) {
        self.admins.clear_cache();
        self.vehicles.clear_cache();
        self.customers.clear_cache();
        self.support_requests.clear_cache();
        self.workshops.clear_cache();
        self.social_links.clear_cache();
        self.statistics.clear_cache();
        self.maintenance_logs.clear_cache();
    }
}
