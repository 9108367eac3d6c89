//! Limitation enricher
//!
//! Attaches the connector limit and the site-area limit in force when an
//! interval closed, and decides whether a flat interval counts as inactivity.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::context::StationContext;
use crate::config::EngineConfig;
use crate::domain::charging_station::{ChargingStation, ConnectorLimitSource};
use crate::domain::consumption::Consumption;
use crate::domain::ports::IntegrationProvider;
use crate::domain::site_area::SiteAreaLimitSource;
use crate::domain::tenant::TenantComponent;
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::decimal::{round_to, safe_div};
use crate::shared::with_timeout;

pub struct LimitationEnricher {
    repos: Arc<dyn RepositoryProvider>,
    integrations: Arc<dyn IntegrationProvider>,
    vendor_timeout_secs: u64,
    min_amps_per_phase: Decimal,
}

impl LimitationEnricher {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        integrations: Arc<dyn IntegrationProvider>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repos,
            integrations,
            vendor_timeout_secs: config.vendor.timeout_secs,
            min_amps_per_phase: Decimal::from(config.limits.min_amps_per_phase),
        }
    }

    pub async fn enrich(
        &self,
        ctx: &mut StationContext,
        connector_id: u32,
        consumption: &mut Consumption,
    ) -> DomainResult<()> {
        self.add_connector_limit(ctx, connector_id, consumption).await?;
        self.add_site_area_limit(ctx, consumption).await
    }

    async fn add_connector_limit(
        &self,
        ctx: &StationContext,
        connector_id: u32,
        consumption: &mut Consumption,
    ) -> DomainResult<()> {
        if let Some(vendor) = self.integrations.vendor(&ctx.station) {
            let limit = with_timeout(
                "vendor.get_current_connector_limit",
                self.vendor_timeout_secs,
                vendor.get_current_connector_limit(&ctx.tenant, &ctx.station, connector_id),
            )
            .await?;
            consumption.limit_amps = limit.limit_amps;
            consumption.limit_watts = limit.limit_watts;
            consumption.limit_source = Some(limit.limit_source);
            return Ok(());
        }

        let connector = ctx.station.connector(connector_id);
        consumption.limit_amps = connector.and_then(|c| c.amperage_limit);
        consumption.limit_watts = connector.and_then(|c| c.power);
        consumption.limit_source = Some(ConnectorLimitSource::Connector);
        Ok(())
    }

    async fn add_site_area_limit(
        &self,
        ctx: &mut StationContext,
        consumption: &mut Consumption,
    ) -> DomainResult<()> {
        if !ctx.tenant.is_component_active(TenantComponent::Organization) {
            return Ok(());
        }
        let Some(site_area) = ctx.site_area.as_mut() else {
            return Ok(());
        };

        if let Some(maximum_power) = site_area.configured_maximum_power() {
            consumption.limit_site_area_watts = Some(maximum_power);
            consumption.limit_site_area_amps = safe_div(maximum_power, site_area.voltage);
            consumption.limit_site_area_source = Some(SiteAreaLimitSource::SiteArea);
        } else {
            let stations = self
                .repos
                .charging_stations()
                .find_by_site_area(&site_area.id)
                .await?;
            let watts: Decimal = stations.iter().map(|s| s.total_connector_power()).sum();
            consumption.limit_site_area_watts = Some(watts);
            consumption.limit_site_area_amps =
                Some(safe_div(watts, site_area.voltage).map_or(Decimal::ZERO, |a| round_to(a, 0)));
            consumption.limit_site_area_source = Some(SiteAreaLimitSource::ChargingStations);

            // Cached for the next interval; concurrent writers compute the same value
            site_area.maximum_power = Some(watts);
            self.repos.site_areas().save_site_area(site_area.clone()).await?;
            debug!(
                site_area_id = site_area.id.as_str(),
                maximum_power = %watts,
                "Site area maximum power computed from connectors"
            );
        }
        consumption.smart_charging_active = site_area.smart_charging;
        Ok(())
    }

    /// Whether a flat interval is station inactivity.
    ///
    /// A charging profile below the minimum current per connected phase is a
    /// deliberate pause, not inactivity.
    pub fn accrues_inactivity(
        &self,
        station: &ChargingStation,
        connector_id: u32,
        consumption: &Consumption,
    ) -> bool {
        if consumption.limit_source != Some(ConnectorLimitSource::ChargingProfile) {
            return true;
        }
        let threshold = self.min_amps_per_phase * Decimal::from(station.connected_phases(connector_id));
        consumption.limit_amps.map_or(false, |amps| amps >= threshold)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charging_station::{
        ChargingStationRepository, Connector, ConnectorLimit, CurrentType,
    };
    use crate::domain::ports::ChargingStationVendor;
    use crate::domain::site_area::{SiteArea, SiteAreaRepository};
    use crate::domain::tenant::Tenant;
    use crate::domain::DomainError;
    use crate::infrastructure::{InMemoryStorage, StaticIntegrations};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    struct ProfileVendor {
        amps: Decimal,
    }

    #[async_trait]
    impl ChargingStationVendor for ProfileVendor {
        async fn get_current_connector_limit(
            &self,
            _tenant: &Tenant,
            _station: &ChargingStation,
            _connector_id: u32,
        ) -> DomainResult<ConnectorLimit> {
            Ok(ConnectorLimit {
                limit_amps: Some(self.amps),
                limit_watts: Some(self.amps * Decimal::from(230)),
                limit_source: ConnectorLimitSource::ChargingProfile,
            })
        }
    }

    struct StuckVendor;

    #[async_trait]
    impl ChargingStationVendor for StuckVendor {
        async fn get_current_connector_limit(
            &self,
            _tenant: &Tenant,
            _station: &ChargingStation,
            _connector_id: u32,
        ) -> DomainResult<ConnectorLimit> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(DomainError::Vendor("unreachable".into()))
        }
    }

    fn sample_station(id: &str, power: i64) -> ChargingStation {
        let mut station = ChargingStation::new(id);
        station.site_area_id = Some("SA1".into());
        station.vendor = Some("Schneider".into());
        station.voltage = Some(Decimal::from(230));
        let mut connector = Connector::new(1, CurrentType::Ac);
        connector.power = Some(Decimal::from(power));
        connector.amperage_limit = Some(Decimal::from(96));
        station.connectors.push(connector);
        station
    }

    fn sample_ctx(tenant: Tenant, site_area: Option<SiteArea>) -> StationContext {
        StationContext {
            tenant,
            station: sample_station("CP001", 22_080),
            site_area,
        }
    }

    fn enricher(storage: Arc<InMemoryStorage>, integrations: StaticIntegrations) -> LimitationEnricher {
        LimitationEnricher::new(storage, Arc::new(integrations), &EngineConfig::default())
    }

    fn sample_consumption() -> Consumption {
        Consumption::new(1, "CP001", 1, Utc::now())
    }

    #[tokio::test]
    async fn connector_rating_without_vendor() {
        let enricher = enricher(Arc::new(InMemoryStorage::new()), StaticIntegrations::new());
        let mut ctx = sample_ctx(Tenant::new("t1", "Tenant"), None);
        let mut c = sample_consumption();
        enricher.enrich(&mut ctx, 1, &mut c).await.unwrap();

        assert_eq!(c.limit_amps, Some(Decimal::from(96)));
        assert_eq!(c.limit_watts, Some(Decimal::from(22_080)));
        assert_eq!(c.limit_source, Some(ConnectorLimitSource::Connector));
        assert_eq!(c.limit_site_area_source, None);
    }

    #[tokio::test]
    async fn vendor_limit_wins() {
        let integrations = StaticIntegrations::new().with_vendor(
            "schneider",
            Arc::new(ProfileVendor {
                amps: Decimal::from(32),
            }),
        );
        let enricher = enricher(Arc::new(InMemoryStorage::new()), integrations);
        let mut ctx = sample_ctx(Tenant::new("t1", "Tenant"), None);
        let mut c = sample_consumption();
        enricher.enrich(&mut ctx, 1, &mut c).await.unwrap();

        assert_eq!(c.limit_amps, Some(Decimal::from(32)));
        assert_eq!(c.limit_source, Some(ConnectorLimitSource::ChargingProfile));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_vendor_times_out() {
        let integrations = StaticIntegrations::new().with_vendor("schneider", Arc::new(StuckVendor));
        let enricher = enricher(Arc::new(InMemoryStorage::new()), integrations);
        let mut ctx = sample_ctx(Tenant::new("t1", "Tenant"), None);
        let mut c = sample_consumption();
        let err = enricher.enrich(&mut ctx, 1, &mut c).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(c.limit_source, None);
    }

    #[tokio::test]
    async fn site_area_limit_summed_and_cached() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .save_charging_station(sample_station("CP001", 22_080))
            .await
            .unwrap();
        storage
            .save_charging_station(sample_station("CP002", 11_040))
            .await
            .unwrap();
        let site_area = SiteArea::new("SA1", "Parking", Decimal::from(230));
        storage.save_site_area(site_area.clone()).await.unwrap();

        let enricher = enricher(storage.clone(), StaticIntegrations::new());
        let tenant = Tenant::new("t1", "Tenant").with_component(TenantComponent::Organization);
        let mut ctx = sample_ctx(tenant, Some(site_area));
        let mut c = sample_consumption();
        enricher.enrich(&mut ctx, 1, &mut c).await.unwrap();

        assert_eq!(c.limit_site_area_watts, Some(Decimal::from(33_120)));
        assert_eq!(c.limit_site_area_amps, Some(Decimal::from(144)));
        assert_eq!(
            c.limit_site_area_source,
            Some(SiteAreaLimitSource::ChargingStations)
        );
        let cached = storage.get_site_area("SA1").await.unwrap().unwrap();
        assert_eq!(cached.maximum_power, Some(Decimal::from(33_120)));
        assert_eq!(
            ctx.site_area.as_ref().and_then(|sa| sa.maximum_power),
            Some(Decimal::from(33_120))
        );

        // Next interval reads the cached value
        let mut next = sample_consumption();
        enricher.enrich(&mut ctx, 1, &mut next).await.unwrap();
        assert_eq!(next.limit_site_area_source, Some(SiteAreaLimitSource::SiteArea));
        assert_eq!(next.limit_site_area_amps, Some(Decimal::from(144)));
    }

    #[tokio::test]
    async fn site_area_ignored_without_organization() {
        let enricher = enricher(Arc::new(InMemoryStorage::new()), StaticIntegrations::new());
        let mut site_area = SiteArea::new("SA1", "Parking", Decimal::from(230));
        site_area.maximum_power = Some(Decimal::from(50_000));
        let mut ctx = sample_ctx(Tenant::new("t1", "Tenant"), Some(site_area));
        let mut c = sample_consumption();
        enricher.enrich(&mut ctx, 1, &mut c).await.unwrap();
        assert_eq!(c.limit_site_area_watts, None);
        assert!(!c.smart_charging_active);
    }

    #[test]
    fn low_charging_profile_is_not_inactivity() {
        let enricher = enricher(Arc::new(InMemoryStorage::new()), StaticIntegrations::new());
        let station = sample_station("CP001", 22_080);
        let mut c = sample_consumption();
        assert!(enricher.accrues_inactivity(&station, 1, &c));

        c.limit_source = Some(ConnectorLimitSource::ChargingProfile);
        c.limit_amps = Some(Decimal::from(20));
        assert!(!enricher.accrues_inactivity(&station, 1, &c));
        c.limit_amps = Some(Decimal::from(39));
        assert!(enricher.accrues_inactivity(&station, 1, &c));
    }
}
