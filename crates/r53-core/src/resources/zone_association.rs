// # Zone Association
//
// Associates an extra VPC with a private hosted zone, for VPCs that are
// managed separately from the zone (e.g. in another account).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, found, ignore_not_found};
use crate::error::{Error, Result};
use crate::model::Vpc;
use crate::naming;
use crate::traits::Resource;
use crate::waiter;

/// Declared association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAssociationConfig {
    pub zone_id: String,
    pub vpc_id: String,
    /// Defaults to the provider region
    #[serde(default)]
    pub vpc_region: Option<String>,
}

/// Observed association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAssociationState {
    pub zone_id: String,
    pub vpc_id: String,
    pub vpc_region: Option<String>,
}

/// Parse `ZONE:VPC[:REGION]`
fn parse_id(id: &str) -> Result<(String, String, Option<String>)> {
    let parts: Vec<&str> = id.split(':').collect();
    match parts.as_slice() {
        [zone, vpc] if !zone.is_empty() && !vpc.is_empty() => {
            Ok((naming::clean_zone_id(zone), vpc.to_string(), None))
        }
        [zone, vpc, region] if !zone.is_empty() && !vpc.is_empty() && !region.is_empty() => {
            Ok((naming::clean_zone_id(zone), vpc.to_string(), Some(region.to_string())))
        }
        _ => Err(Error::invalid_input(format!(
            "malformed zone association ID {id:?}, expected ZONEID:VPCID[:REGION]"
        ))),
    }
}

/// `zone_association` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneAssociationResource;

impl ZoneAssociationResource {
    fn vpc(ctx: &ProviderContext, config: &ZoneAssociationConfig) -> Vpc {
        Vpc {
            vpc_id: config.vpc_id.clone(),
            vpc_region: config.vpc_region.clone().or_else(|| ctx.region.clone()),
        }
    }
}

#[async_trait]
impl Resource for ZoneAssociationResource {
    const KIND: ResourceKind = ResourceKind::ZoneAssociation;
    type Config = ZoneAssociationConfig;
    type State = ZoneAssociationState;

    fn id(&self, state: &ZoneAssociationState) -> String {
        match &state.vpc_region {
            Some(region) => format!("{}:{}:{}", state.zone_id, state.vpc_id, region),
            None => format!("{}:{}", state.zone_id, state.vpc_id),
        }
    }

    fn validate(&self, config: &ZoneAssociationConfig) -> Result<()> {
        if config.zone_id.is_empty() || config.vpc_id.is_empty() {
            return Err(Error::invalid_input("zone_id and vpc_id are required"));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &ZoneAssociationConfig,
    ) -> Result<ZoneAssociationState> {
        let zone_id = naming::clean_zone_id(&config.zone_id);
        let vpc = Self::vpc(ctx, config);

        info!(zone_id = %zone_id, vpc_id = %vpc.vpc_id, "Associating VPC with hosted zone");
        let change = ctx.api().associate_vpc(&zone_id, &vpc, None).await?;
        waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone_association()).await?;

        Ok(ZoneAssociationState {
            zone_id,
            vpc_id: vpc.vpc_id,
            vpc_region: vpc.vpc_region,
        })
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<ZoneAssociationState>> {
        let (zone_id, vpc_id, region) = parse_id(id)?;
        let Some(details) = found(ctx.api().get_hosted_zone(&zone_id).await)? else {
            return Ok(None);
        };

        let associated = details.vpcs.into_iter().find(|vpc| {
            vpc.vpc_id == vpc_id && (region.is_none() || vpc.vpc_region == region)
        });

        Ok(associated.map(|vpc| ZoneAssociationState {
            zone_id,
            vpc_id: vpc.vpc_id,
            vpc_region: vpc.vpc_region,
        }))
    }

    async fn update(
        &self,
        _ctx: &ProviderContext,
        prior: &ZoneAssociationState,
        _config: &ZoneAssociationConfig,
    ) -> Result<ZoneAssociationState> {
        // every attribute forces replacement
        Ok(prior.clone())
    }

    async fn delete(&self, ctx: &ProviderContext, state: &ZoneAssociationState) -> Result<()> {
        let vpc = Vpc {
            vpc_id: state.vpc_id.clone(),
            vpc_region: state.vpc_region.clone(),
        };

        info!(zone_id = %state.zone_id, vpc_id = %vpc.vpc_id, "Disassociating VPC from hosted zone");
        match ctx.api().disassociate_vpc(&state.zone_id, &vpc).await {
            Ok(change) => ignore_not_found(
                waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone_association())
                    .await,
            ),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn requires_replacement(
        &self,
        prior: &ZoneAssociationState,
        config: &ZoneAssociationConfig,
    ) -> bool {
        !self.in_sync(prior, config)
    }

    fn in_sync(&self, prior: &ZoneAssociationState, config: &ZoneAssociationConfig) -> bool {
        prior.zone_id == naming::clean_zone_id(&config.zone_id)
            && prior.vpc_id == config.vpc_id
            && (config.vpc_region.is_none() || config.vpc_region == prior.vpc_region)
    }
}
