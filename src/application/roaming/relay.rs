//! Roaming relay
//!
//! Mirrors the lifecycle of transactions started by federated users to the
//! roaming platform that issued them. Any missing prerequisite is a hard
//! failure: a federated session must not silently diverge from the
//! partner's view of it.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::application::consumption::StationContext;
use crate::config::EngineConfig;
use crate::domain::authorization::AuthorizationFilter;
use crate::domain::ports::{IntegrationProvider, OcpiCpoClient, OicpCpoClient, RoamingProtocol};
use crate::domain::tenant::TenantComponent;
use crate::domain::transaction::{Transaction, TransactionAction};
use crate::domain::user::{User, UserOrigin};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::with_timeout;

/// Roaming session picked up at START
#[derive(Debug, Clone, PartialEq)]
struct OicpIdentification {
    session_id: String,
    identification: Option<String>,
}

pub struct RoamingRelay {
    repos: Arc<dyn RepositoryProvider>,
    integrations: Arc<dyn IntegrationProvider>,
    timeout_secs: u64,
    lookback: Duration,
}

impl RoamingRelay {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        integrations: Arc<dyn IntegrationProvider>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repos,
            integrations,
            timeout_secs: config.roaming.timeout_secs,
            lookback: Duration::minutes(config.roaming.authorization_lookback_mins),
        }
    }

    /// Mirror `action` to the user's roaming platform, if the user is federated.
    pub async fn relay(
        &self,
        ctx: &StationContext,
        transaction: &mut Transaction,
        action: TransactionAction,
    ) -> DomainResult<()> {
        let Some(user) = self.federated_user(transaction).await? else {
            return Ok(());
        };
        let protocol = match user.origin {
            UserOrigin::Ocpi => RoamingProtocol::Ocpi,
            UserOrigin::Oicp => RoamingProtocol::Oicp,
            UserOrigin::Local => return Ok(()),
        };
        let component = match protocol {
            RoamingProtocol::Ocpi => TenantComponent::Ocpi,
            RoamingProtocol::Oicp => TenantComponent::Oicp,
        };
        if !ctx.tenant.is_component_active(component) {
            return Err(DomainError::Configuration(format!(
                "Unable to {action} a transaction for user '{}' not issued locally: \
                 {protocol} component is not active",
                user.id
            )));
        }

        match protocol {
            RoamingProtocol::Ocpi => {
                let client = self.integrations.ocpi_cpo_client(&ctx.tenant).ok_or_else(|| {
                    missing_client(protocol, action)
                })?;
                self.relay_ocpi(client, ctx, transaction, action).await?;
            }
            RoamingProtocol::Oicp => {
                let client = self.integrations.oicp_cpo_client(&ctx.tenant).ok_or_else(|| {
                    missing_client(protocol, action)
                })?;
                self.relay_oicp(client, ctx, transaction, action).await?;
            }
        }

        metrics::counter!(
            "roaming_calls_total",
            "protocol" => protocol.as_str(),
            "action" => action.as_str()
        )
        .increment(1);
        info!(
            tenant_id = ctx.tenant.id.as_str(),
            transaction_id = transaction.id,
            charge_point_id = transaction.charge_point_id.as_str(),
            %protocol,
            %action,
            "Transaction relayed to roaming platform"
        );
        Ok(())
    }

    async fn federated_user(&self, transaction: &Transaction) -> DomainResult<Option<User>> {
        let Some(user_id) = transaction.user_id.as_deref() else {
            return Ok(None);
        };
        let user = self
            .repos
            .users()
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", user_id))?;
        if !user.is_federated() {
            debug!(transaction_id = transaction.id, "Local user, roaming skipped");
            return Ok(None);
        }
        Ok(Some(user))
    }

    async fn relay_ocpi(
        &self,
        client: Arc<dyn OcpiCpoClient>,
        ctx: &StationContext,
        transaction: &mut Transaction,
        action: TransactionAction,
    ) -> DomainResult<()> {
        let secs = self.timeout_secs;
        match action {
            TransactionAction::Start => {
                let tag = self
                    .repos
                    .tags()
                    .get_tag(&transaction.tag_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Tag", "id", &transaction.tag_id))?;
                let token = tag.ocpi_token.ok_or_else(|| {
                    DomainError::Validation(format!(
                        "Tag '{}' cannot start a transaction through OCPI: missing OCPI token",
                        transaction.tag_id
                    ))
                })?;
                let authorization_id = self.unused_ocpi_authorization(transaction).await?;
                with_timeout(
                    "ocpi.start_session",
                    secs,
                    client.start_session(&token, &ctx.station, transaction, &authorization_id),
                )
                .await?;
                transaction.roaming_session_id = Some(authorization_id);
            }
            TransactionAction::Update => {
                with_timeout("ocpi.update_session", secs, client.update_session(transaction)).await?
            }
            TransactionAction::Stop => {
                with_timeout("ocpi.stop_session", secs, client.stop_session(transaction)).await?
            }
            TransactionAction::End => {
                with_timeout("ocpi.post_cdr", secs, client.post_cdr(transaction)).await?
            }
        }
        Ok(())
    }

    /// First authorization id of the lookback window no transaction uses yet.
    /// The OCPI authorization id doubles as the session id.
    async fn unused_ocpi_authorization(&self, transaction: &Transaction) -> DomainResult<String> {
        let authorizations = self
            .repos
            .authorizations()
            .find_authorizations(&self.lookback_filter(transaction))
            .await?;
        for authorization_id in authorizations
            .into_iter()
            .filter_map(|a| a.ocpi_authorization_id)
        {
            let in_use = self
                .repos
                .transactions()
                .find_by_roaming_session_id(&authorization_id)
                .await?;
            if in_use.is_none() {
                return Ok(authorization_id);
            }
        }
        Err(DomainError::Validation(format!(
            "Tag '{}' cannot start transaction {} through OCPI: missing authorization",
            transaction.tag_id, transaction.id
        )))
    }

    async fn relay_oicp(
        &self,
        client: Arc<dyn OicpCpoClient>,
        ctx: &StationContext,
        transaction: &mut Transaction,
        action: TransactionAction,
    ) -> DomainResult<()> {
        let secs = self.timeout_secs;
        match action {
            TransactionAction::Start => {
                let found = match self.oicp_remote_identification(ctx, transaction) {
                    Some(found) => found,
                    None => self
                        .oicp_authorization_identification(transaction)
                        .await?
                        .ok_or_else(|| {
                            DomainError::Validation(format!(
                                "No authorization for transaction {}: OICP session not started",
                                transaction.id
                            ))
                        })?,
                };
                with_timeout(
                    "oicp.start_session",
                    secs,
                    client.start_session(
                        &ctx.station,
                        transaction,
                        &found.session_id,
                        found.identification.as_deref(),
                    ),
                )
                .await?;
                transaction.roaming_session_id = Some(found.session_id);
            }
            TransactionAction::Update => {
                with_timeout("oicp.update_session", secs, client.update_session(transaction)).await?
            }
            TransactionAction::Stop => {
                with_timeout("oicp.stop_session", secs, client.stop_session(transaction)).await?
            }
            TransactionAction::End => {
                with_timeout("oicp.push_cdr", secs, client.push_cdr(transaction)).await?
            }
        }
        Ok(())
    }

    /// Remote start pushed by Hubject on this connector within the lookback window
    fn oicp_remote_identification(
        &self,
        ctx: &StationContext,
        transaction: &Transaction,
    ) -> Option<OicpIdentification> {
        let since = transaction.timestamp - self.lookback;
        ctx.station
            .remote_authorizations
            .iter()
            .find(|ra| ra.connector_id == transaction.connector_id && ra.timestamp >= since)
            .map(|ra| OicpIdentification {
                session_id: ra.id.clone(),
                identification: ra.oicp_identification.clone(),
            })
    }

    /// Local authorization forwarded to Hubject within the lookback window
    async fn oicp_authorization_identification(
        &self,
        transaction: &Transaction,
    ) -> DomainResult<Option<OicpIdentification>> {
        let authorizations = self
            .repos
            .authorizations()
            .find_authorizations(&self.lookback_filter(transaction))
            .await?;
        Ok(authorizations.into_iter().find_map(|a| {
            a.oicp_session_id.map(|session_id| OicpIdentification {
                session_id,
                identification: a.oicp_identification,
            })
        }))
    }

    fn lookback_filter(&self, transaction: &Transaction) -> AuthorizationFilter {
        AuthorizationFilter {
            charge_point_id: transaction.charge_point_id.clone(),
            tag_id: transaction.tag_id.clone(),
            date_from: transaction.timestamp - self.lookback,
        }
    }
}

fn missing_client(protocol: RoamingProtocol, action: TransactionAction) -> DomainError {
    DomainError::Configuration(format!(
        "{protocol} component requires at least one CPO endpoint to {action} a session"
    ))
}
