// # Hosted Zone DNSSEC
//
// Turns DNSSEC signing on or off for a zone. Signing needs at least one
// active key-signing key in the zone.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, found};
use crate::error::{Error, Result};
use crate::model::ServeSignature;
use crate::naming;
use crate::traits::Resource;
use crate::waiter;

fn default_signing_status() -> ServeSignature {
    ServeSignature::Signing
}

/// Declared signing status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedZoneDnssecConfig {
    pub hosted_zone_id: String,
    #[serde(default = "default_signing_status")]
    pub signing_status: ServeSignature,
}

/// Observed signing status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedZoneDnssecState {
    pub hosted_zone_id: String,
    pub signing_status: ServeSignature,
}

/// `hosted_zone_dnssec` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct HostedZoneDnssecResource;

impl HostedZoneDnssecResource {
    async fn set_signing(
        ctx: &ProviderContext,
        zone_id: &str,
        target: ServeSignature,
    ) -> Result<HostedZoneDnssecState> {
        info!(zone_id = %zone_id, status = %target, "Changing DNSSEC signing");
        let change = match target {
            ServeSignature::Signing => ctx.api().enable_hosted_zone_dnssec(zone_id).await?,
            _ => ctx.api().disable_hosted_zone_dnssec(zone_id).await?,
        };

        let wait = ctx.timeouts.dnssec();
        waiter::wait_for_change_insync(ctx.api(), &change, &wait).await?;
        let info = waiter::wait_for_serve_signature(ctx.api(), zone_id, target, &wait).await?;

        Ok(HostedZoneDnssecState {
            hosted_zone_id: zone_id.to_string(),
            signing_status: info.serve_signature,
        })
    }
}

#[async_trait]
impl Resource for HostedZoneDnssecResource {
    const KIND: ResourceKind = ResourceKind::HostedZoneDnssec;
    type Config = HostedZoneDnssecConfig;
    type State = HostedZoneDnssecState;

    fn id(&self, state: &HostedZoneDnssecState) -> String {
        state.hosted_zone_id.clone()
    }

    fn validate(&self, config: &HostedZoneDnssecConfig) -> Result<()> {
        match config.signing_status {
            ServeSignature::Signing | ServeSignature::NotSigning => Ok(()),
            other => Err(Error::invalid_input(format!(
                "signing_status must be SIGNING or NOT_SIGNING, got {other}"
            ))),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &HostedZoneDnssecConfig,
    ) -> Result<HostedZoneDnssecState> {
        let zone_id = naming::clean_zone_id(&config.hosted_zone_id);
        Self::set_signing(ctx, &zone_id, config.signing_status).await
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<HostedZoneDnssecState>> {
        let zone_id = naming::clean_zone_id(id);
        Ok(found(ctx.api().get_dnssec(&zone_id).await)?.map(|info| HostedZoneDnssecState {
            hosted_zone_id: zone_id,
            signing_status: info.serve_signature,
        }))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &HostedZoneDnssecState,
        config: &HostedZoneDnssecConfig,
    ) -> Result<HostedZoneDnssecState> {
        if prior.signing_status == config.signing_status {
            return Ok(prior.clone());
        }
        Self::set_signing(ctx, &prior.hosted_zone_id, config.signing_status).await
    }

    async fn delete(&self, ctx: &ProviderContext, state: &HostedZoneDnssecState) -> Result<()> {
        if state.signing_status == ServeSignature::NotSigning {
            return Ok(());
        }
        match Self::set_signing(ctx, &state.hosted_zone_id, ServeSignature::NotSigning).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other.map(|_| ()),
        }
    }

    fn requires_replacement(
        &self,
        prior: &HostedZoneDnssecState,
        config: &HostedZoneDnssecConfig,
    ) -> bool {
        prior.hosted_zone_id != naming::clean_zone_id(&config.hosted_zone_id)
    }

    fn in_sync(&self, prior: &HostedZoneDnssecState, config: &HostedZoneDnssecConfig) -> bool {
        !self.requires_replacement(prior, config) && prior.signing_status == config.signing_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_is_default() {
        let c: HostedZoneDnssecConfig =
            serde_json::from_value(serde_json::json!({"hosted_zone_id": "Z1"})).unwrap();
        assert_eq!(c.signing_status, ServeSignature::Signing);
        assert!(HostedZoneDnssecResource.validate(&c).is_ok());
    }

    #[test]
    fn test_only_signing_states_declarable() {
        let c = HostedZoneDnssecConfig {
            hosted_zone_id: "Z1".into(),
            signing_status: ServeSignature::Deleting,
        };
        assert!(HostedZoneDnssecResource.validate(&c).is_err());
    }

    #[test]
    fn test_in_sync() {
        let state = HostedZoneDnssecState {
            hosted_zone_id: "Z1".into(),
            signing_status: ServeSignature::Signing,
        };
        let c = HostedZoneDnssecConfig {
            hosted_zone_id: "/hostedzone/Z1".into(),
            signing_status: ServeSignature::Signing,
        };
        assert!(HostedZoneDnssecResource.in_sync(&state, &c));

        let off = HostedZoneDnssecConfig { signing_status: ServeSignature::NotSigning, ..c };
        assert!(!HostedZoneDnssecResource.in_sync(&state, &off));
        assert!(!HostedZoneDnssecResource.requires_replacement(&state, &off));
    }
}
