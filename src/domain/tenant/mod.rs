//! Tenant aggregate

pub mod model;
pub mod repository;

pub use model::{Tenant, TenantComponent};
pub use repository::TenantRepository;
