pub mod admin;
pub mod common;
pub mod content;
pub mod customer;
pub mod dashboard;
pub mod offer;
pub mod support;
pub mod vehicle;
pub mod workshop;

pub use admin::*;
pub use common::{Envelope, NamedRef, PaginationMeta};
pub use content::*;
pub use customer::*;
pub use dashboard::*;
pub use offer::*;
pub use support::*;
pub use vehicle::*;
pub use workshop::*;
