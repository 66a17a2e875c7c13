//! FleetDesk core: REST transport, resource models, and the per-collection
//! response cache behind the vehicle-service admin console.

pub mod api;
pub mod cache;
pub mod config;
pub mod console;
pub mod models;
pub mod resource;
pub mod utils;

pub use api::{ApiClient, ApiError, HttpRequest, Method, Transport};
pub use cache::{CacheScope, CacheStatus, CacheTtl, ListDefaults, ListParams, Sort, SortDirection};
pub use config::Config;
pub use console::Console;
pub use resource::{ClientOptions, Listing, ResourceClient, Source};
