// # Hosted Zone
//
// Public zones get a delegation set and name servers; private zones are
// created attached to their first VPC and further VPCs are associated one by
// one. Deleting a zone with `force_destroy` first empties it of everything
// but the apex SOA/NS records and turns DNSSEC signing off.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{ProviderContext, ResourceKind, caller_reference, found, ignore_not_found, sync_tags};
use crate::error::{Error, Result};
use crate::model::{
    Change, CreateHostedZoneRequest, HostedZoneDetails, MAX_CHANGES_PER_BATCH, ServeSignature,
    TaggableResource, Tags, Vpc,
};
use crate::naming;
use crate::traits::Resource;
use crate::waiter;

fn default_comment() -> String {
    "Managed by r53".to_string()
}

/// Declared hosted zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    #[serde(default = "default_comment")]
    pub comment: String,
    /// Non-empty makes the zone private
    #[serde(default)]
    pub vpcs: Vec<Vpc>,
    #[serde(default)]
    pub delegation_set_id: Option<String>,
    /// Delete all records (and disable DNSSEC) before deleting the zone
    #[serde(default)]
    pub force_destroy: bool,
    #[serde(default)]
    pub tags: Tags,
}

/// Observed hosted zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneState {
    pub zone_id: String,
    pub arn: String,
    pub name: String,
    pub comment: String,
    pub vpcs: Vec<Vpc>,
    pub delegation_set_id: Option<String>,
    pub name_servers: Vec<String>,
    pub primary_name_server: Option<String>,
    pub force_destroy: bool,
    pub tags: Tags,
}

impl ZoneState {
    fn is_private(&self) -> bool {
        !self.vpcs.is_empty()
    }
}

/// `zone` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneResource;

impl ZoneResource {
    /// Fill in the provider region for VPCs declared without one
    fn declared_vpcs(ctx: &ProviderContext, config: &ZoneConfig) -> BTreeSet<Vpc> {
        config
            .vpcs
            .iter()
            .map(|vpc| Vpc {
                vpc_id: vpc.vpc_id.clone(),
                vpc_region: vpc.vpc_region.clone().or_else(|| ctx.region.clone()),
            })
            .collect()
    }

    fn vpcs_match(declared: &[Vpc], observed: &[Vpc]) -> bool {
        let observed: BTreeSet<&Vpc> = observed.iter().collect();
        declared.len() == observed.len()
            && declared.iter().all(|d| {
                observed.iter().any(|o| {
                    o.vpc_id == d.vpc_id
                        && (d.vpc_region.is_none() || d.vpc_region == o.vpc_region)
                })
            })
    }

    fn state_from(details: HostedZoneDetails, tags: Tags, force_destroy: bool) -> ZoneState {
        let mut vpcs = details.vpcs;
        vpcs.sort();
        ZoneState {
            arn: format!("arn:aws:route53:::hostedzone/{}", details.zone.id),
            zone_id: details.zone.id,
            name: naming::normalize_name(&details.zone.name),
            comment: details.zone.comment.unwrap_or_default(),
            vpcs,
            delegation_set_id: details.delegation_set_id,
            primary_name_server: details.name_servers.first().cloned(),
            name_servers: details.name_servers,
            force_destroy,
            tags,
        }
    }

    async fn associate_all(
        ctx: &ProviderContext,
        zone_id: &str,
        vpcs: impl IntoIterator<Item = &Vpc>,
    ) -> Result<()> {
        for vpc in vpcs {
            info!(zone_id, vpc_id = %vpc.vpc_id, "Associating VPC");
            let change = ctx.api().associate_vpc(zone_id, vpc, None).await?;
            waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone_association())
                .await?;
        }
        Ok(())
    }

    /// Delete every record set except the apex SOA and NS
    async fn delete_all_records(ctx: &ProviderContext, state: &ZoneState) -> Result<()> {
        let record_sets = ctx.api().list_resource_record_sets(&state.zone_id).await?;
        let changes: Vec<Change> = record_sets
            .into_iter()
            .filter(|rs| !rs.is_apex_authority(&state.name))
            .map(Change::delete)
            .collect();

        if changes.is_empty() {
            return Ok(());
        }
        info!(zone_id = %state.zone_id, count = changes.len(), "Deleting all records before zone deletion");

        for batch in changes.chunks(MAX_CHANGES_PER_BATCH) {
            let change = ctx
                .api()
                .change_resource_record_sets(&state.zone_id, Some("Deleted by r53 force_destroy"), batch)
                .await?;
            waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone()).await?;
        }
        Ok(())
    }

    /// Turn DNSSEC signing off if it is on
    async fn disable_dnssec(ctx: &ProviderContext, zone_id: &str) -> Result<()> {
        let Some(info) = found(ctx.api().get_dnssec(zone_id).await)? else {
            return Ok(());
        };
        if info.serve_signature == ServeSignature::NotSigning {
            return Ok(());
        }

        info!(zone_id, "Disabling DNSSEC before zone deletion");
        let change = ctx.api().disable_hosted_zone_dnssec(zone_id).await?;
        waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.dnssec()).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for ZoneResource {
    const KIND: ResourceKind = ResourceKind::Zone;
    type Config = ZoneConfig;
    type State = ZoneState;

    fn id(&self, state: &ZoneState) -> String {
        state.zone_id.clone()
    }

    fn validate(&self, config: &ZoneConfig) -> Result<()> {
        if naming::normalize_name(&config.name).is_empty() {
            return Err(Error::invalid_input("zone name cannot be empty"));
        }
        if !config.vpcs.is_empty() && config.delegation_set_id.is_some() {
            return Err(Error::invalid_input(
                "delegation_set_id cannot be set on a private zone (vpcs given)",
            ));
        }
        if config.comment.len() > 256 {
            return Err(Error::invalid_input("zone comment is limited to 256 characters"));
        }
        Ok(())
    }

    async fn create(&self, ctx: &ProviderContext, config: &ZoneConfig) -> Result<ZoneState> {
        let vpcs = Self::declared_vpcs(ctx, config);
        let mut vpc_iter = vpcs.iter();

        let request = CreateHostedZoneRequest {
            name: naming::normalize_name(&config.name),
            caller_reference: caller_reference("zone"),
            comment: Some(config.comment.clone()),
            vpc: vpc_iter.next().cloned(),
            delegation_set_id: config.delegation_set_id.clone(),
        };

        info!(name = %request.name, private = request.vpc.is_some(), "Creating hosted zone");
        let response = ctx.api().create_hosted_zone(&request).await?;
        let zone_id = naming::clean_zone_id(&response.zone.id);

        let finished: Result<ZoneState> = async {
            waiter::wait_for_change_insync(ctx.api(), &response.change, &ctx.timeouts.zone())
                .await?;
            Self::associate_all(ctx, &zone_id, vpc_iter).await?;
            sync_tags(ctx.api(), TaggableResource::HostedZone, &zone_id, &Tags::new(), &config.tags)
                .await?;
            self.read(ctx, &zone_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("hosted zone {zone_id} vanished after create")))
        }
        .await;

        let mut state = finished.map_err(|e| Error::incomplete("hosted zone", &zone_id, e))?;
        state.force_destroy = config.force_destroy;
        Ok(state)
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<ZoneState>> {
        let zone_id = naming::clean_zone_id(id);
        let Some(details) = found(ctx.api().get_hosted_zone(&zone_id).await)? else {
            return Ok(None);
        };
        let tags = ctx.api().list_tags(TaggableResource::HostedZone, &zone_id).await?;
        Ok(Some(Self::state_from(details, tags, false)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &ZoneState,
        config: &ZoneConfig,
    ) -> Result<ZoneState> {
        let zone_id = prior.zone_id.as_str();

        if prior.comment != config.comment {
            debug!(zone_id, "Updating zone comment");
            ctx.api().update_hosted_zone_comment(zone_id, Some(&config.comment)).await?;
        }

        if prior.is_private() {
            let declared = Self::declared_vpcs(ctx, config);
            let observed: BTreeSet<Vpc> = prior.vpcs.iter().cloned().collect();

            // associate first so the zone is never left without a VPC
            Self::associate_all(ctx, zone_id, declared.difference(&observed)).await?;
            for vpc in observed.difference(&declared) {
                info!(zone_id, vpc_id = %vpc.vpc_id, "Disassociating VPC");
                let change = ctx.api().disassociate_vpc(zone_id, vpc).await?;
                waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone_association())
                    .await?;
            }
        }

        sync_tags(ctx.api(), TaggableResource::HostedZone, zone_id, &prior.tags, &config.tags)
            .await?;

        let mut state = self
            .read(ctx, zone_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("hosted zone {zone_id} vanished during update")))?;
        state.force_destroy = config.force_destroy;
        Ok(state)
    }

    async fn delete(&self, ctx: &ProviderContext, state: &ZoneState) -> Result<()> {
        if state.force_destroy {
            match Self::delete_all_records(ctx, state).await {
                Err(e) if e.is_not_found() => return Ok(()),
                other => other?,
            }
            if !state.is_private() {
                Self::disable_dnssec(ctx, &state.zone_id).await?;
            }
        }

        info!(zone_id = %state.zone_id, name = %state.name, "Deleting hosted zone");
        match ctx.api().delete_hosted_zone(&state.zone_id).await {
            Ok(change) => {
                ignore_not_found(
                    waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.zone()).await,
                )
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn keep_local(&self, stored: &ZoneState, observed: ZoneState) -> ZoneState {
        ZoneState {
            force_destroy: stored.force_destroy,
            ..observed
        }
    }

    fn requires_replacement(&self, prior: &ZoneState, config: &ZoneConfig) -> bool {
        let delegation_set_changed = config.delegation_set_id.as_deref().is_some_and(|id| {
            prior.delegation_set_id.as_deref() != Some(naming::clean_delegation_set_id(id).as_str())
        });

        prior.name != naming::normalize_name(&config.name)
            || prior.is_private() == config.vpcs.is_empty()
            || delegation_set_changed
    }

    fn in_sync(&self, prior: &ZoneState, config: &ZoneConfig) -> bool {
        prior.comment == config.comment
            && Self::vpcs_match(&config.vpcs, &prior.vpcs)
            && prior.tags == config.tags
            && prior.force_destroy == config.force_destroy
    }
}
