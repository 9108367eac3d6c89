//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::authorization::AuthorizationRepository;
use super::charging_station::ChargingStationRepository;
use super::consumption::ConsumptionRepository;
use super::meter_value::MeterValueRepository;
use super::site_area::SiteAreaRepository;
use super::tag::TagRepository;
use super::tenant::TenantRepository;
use super::transaction::TransactionRepository;
use super::user::UserRepository;

pub use crate::shared::errors::DomainResult;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let tx = repos.transactions().find_by_id(42).await?;
///     let samples = repos.meter_values().get_meter_values(42).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn tenants(&self) -> &dyn TenantRepository;
    fn charging_stations(&self) -> &dyn ChargingStationRepository;
    fn site_areas(&self) -> &dyn SiteAreaRepository;
    fn transactions(&self) -> &dyn TransactionRepository;
    fn consumptions(&self) -> &dyn ConsumptionRepository;
    fn meter_values(&self) -> &dyn MeterValueRepository;
    fn users(&self) -> &dyn UserRepository;
    fn tags(&self) -> &dyn TagRepository;
    fn authorizations(&self) -> &dyn AuthorizationRepository;
}
