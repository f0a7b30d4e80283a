// # Record
//
// A single resource record set. Names may be given relative to the zone
// (`www`) or fully qualified; TXT/SPF values are declared unquoted.
//
// Changing the name, type or set identifier moves the record: the old set is
// deleted and the new one created in the same atomic batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, found};
use crate::error::{Error, Result};
use crate::model::{
    AliasTarget, Change, CidrRoutingConfig, Failover, GeoLocation, GeoProximityLocation,
    RecordType, ResourceRecordSet,
};
use crate::naming::{self, RecordId};
use crate::traits::Resource;
use crate::waiter;

const CHANGE_COMMENT: &str = "Managed by r53";

/// Declared record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub ttl: Option<i64>,
    #[serde(default)]
    pub records: Vec<String>,
    #[serde(default)]
    pub alias: Option<AliasTarget>,
    #[serde(default)]
    pub set_identifier: Option<String>,
    #[serde(default)]
    pub health_check_id: Option<String>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default)]
    pub failover: Option<Failover>,
    #[serde(default)]
    pub geolocation: Option<GeoLocation>,
    #[serde(default)]
    pub geoproximity: Option<GeoProximityLocation>,
    #[serde(default)]
    pub latency_region: Option<String>,
    #[serde(default)]
    pub cidr_routing: Option<CidrRoutingConfig>,
    #[serde(default)]
    pub multivalue_answer: Option<bool>,
    /// Overwrite an existing record set on create instead of failing
    #[serde(default)]
    pub allow_overwrite: bool,
}

impl RecordConfig {
    /// Names of the routing policies that are set
    fn routing_policies(&self) -> Vec<&'static str> {
        let mut policies = Vec::new();
        if self.weight.is_some() {
            policies.push("weighted");
        }
        if self.failover.is_some() {
            policies.push("failover");
        }
        if self.geolocation.is_some() {
            policies.push("geolocation");
        }
        if self.geoproximity.is_some() {
            policies.push("geoproximity");
        }
        if self.latency_region.is_some() {
            policies.push("latency");
        }
        if self.cidr_routing.is_some() {
            policies.push("cidr");
        }
        if self.multivalue_answer == Some(true) {
            policies.push("multivalue answer");
        }
        policies
    }

    /// The record set this config declares, values in declared form
    fn record_set(&self, zone_name: &str) -> ResourceRecordSet {
        ResourceRecordSet {
            name: naming::expand_record_name(&self.name, zone_name),
            record_type: self.record_type,
            set_identifier: self.set_identifier.clone(),
            ttl: if self.alias.is_some() { None } else { self.ttl },
            records: self.records.clone(),
            alias: self.alias.as_ref().map(|alias| AliasTarget {
                dns_name: alias.dns_name.clone(),
                hosted_zone_id: naming::clean_zone_id(&alias.hosted_zone_id),
                evaluate_target_health: alias.evaluate_target_health,
            }),
            weight: self.weight,
            failover: self.failover,
            geolocation: self.geolocation.clone(),
            geoproximity: self.geoproximity.clone(),
            region: self.latency_region.clone(),
            cidr_routing: self.cidr_routing.clone(),
            multi_value_answer: self.multivalue_answer,
            health_check_id: self.health_check_id.clone(),
            traffic_policy_instance_id: None,
        }
    }
}

/// Observed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordState {
    pub id: String,
    pub zone_id: String,
    pub zone_name: String,
    pub fqdn: String,
    /// Values in declared (unquoted) form
    pub record_set: ResourceRecordSet,
}

impl RecordState {
    fn new(zone_id: &str, zone_name: &str, record_set: ResourceRecordSet) -> Self {
        let id = RecordId {
            zone_id: zone_id.to_string(),
            name: record_set.name.clone(),
            record_type: record_set.record_type,
            set_identifier: record_set.set_identifier.clone(),
        };
        Self {
            id: id.to_string(),
            zone_id: zone_id.to_string(),
            zone_name: zone_name.to_string(),
            fqdn: record_set.name.clone(),
            record_set,
        }
    }
}

/// Convert a declared-form record set to wire format
pub(crate) fn to_wire(record_set: &ResourceRecordSet) -> ResourceRecordSet {
    ResourceRecordSet {
        records: naming::encode_record_values(&record_set.records, record_set.record_type),
        ..record_set.clone()
    }
}

/// Convert a wire-format record set to declared form
pub(crate) fn from_wire(record_set: &ResourceRecordSet) -> ResourceRecordSet {
    ResourceRecordSet {
        name: naming::normalize_name(&record_set.name),
        records: naming::decode_record_values(&record_set.records, record_set.record_type),
        ..record_set.clone()
    }
}

/// `record` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResource;

impl RecordResource {
    async fn zone_name(ctx: &ProviderContext, zone_id: &str) -> Result<String> {
        let details = ctx.api().get_hosted_zone(zone_id).await?;
        Ok(naming::normalize_name(&details.zone.name))
    }

    async fn submit(ctx: &ProviderContext, zone_id: &str, changes: &[Change]) -> Result<()> {
        let change = ctx
            .api()
            .change_resource_record_sets(zone_id, Some(CHANGE_COMMENT), changes)
            .await?;
        waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.record()).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for RecordResource {
    const KIND: ResourceKind = ResourceKind::Record;
    type Config = RecordConfig;
    type State = RecordState;

    fn id(&self, state: &RecordState) -> String {
        state.id.clone()
    }

    fn validate(&self, config: &RecordConfig) -> Result<()> {
        match (config.records.is_empty(), &config.alias) {
            (true, None) => {
                return Err(Error::invalid_input("one of records or alias must be set"));
            }
            (false, Some(_)) => {
                return Err(Error::invalid_input("records and alias are mutually exclusive"));
            }
            (false, None) if config.ttl.is_none() => {
                return Err(Error::invalid_input("ttl is required when records are set"));
            }
            (true, Some(_)) if config.ttl.is_some() => {
                return Err(Error::invalid_input("ttl cannot be set on an alias record"));
            }
            _ => {}
        }

        if config.ttl.is_some_and(|ttl| !(0..=2_147_483_647).contains(&ttl)) {
            return Err(Error::invalid_input("ttl must be between 0 and 2147483647"));
        }

        let policies = config.routing_policies();
        if policies.len() > 1 {
            return Err(Error::invalid_input(format!(
                "only one routing policy may be set, got: {}",
                policies.join(", ")
            )));
        }
        match (&config.set_identifier, policies.is_empty()) {
            (Some(_), true) => {
                return Err(Error::invalid_input(
                    "set_identifier requires a routing policy",
                ));
            }
            (None, false) => {
                return Err(Error::invalid_input(format!(
                    "set_identifier is required with the {} routing policy",
                    policies[0]
                )));
            }
            (Some(set), false) if set.is_empty() || set.len() > 128 => {
                return Err(Error::invalid_input(
                    "set_identifier must be 1 to 128 characters",
                ));
            }
            _ => {}
        }

        if config.weight.is_some_and(|w| !(0..=255).contains(&w)) {
            return Err(Error::invalid_input("weight must be between 0 and 255"));
        }
        if let Some(geo) = &config.geolocation {
            if geo.continent_code.is_none() && geo.country_code.is_none() {
                return Err(Error::invalid_input(
                    "geolocation needs a continent_code or country_code",
                ));
            }
        }
        if let Some(geo) = &config.geoproximity {
            let selectors = [
                geo.aws_region.is_some(),
                geo.local_zone_group.is_some(),
                geo.coordinates.is_some(),
            ];
            if selectors.iter().filter(|s| **s).count() != 1 {
                return Err(Error::invalid_input(
                    "geoproximity needs exactly one of aws_region, local_zone_group or coordinates",
                ));
            }
            if geo.bias.is_some_and(|b| !(-99..=99).contains(&b)) {
                return Err(Error::invalid_input("geoproximity bias must be between -99 and 99"));
            }
        }
        Ok(())
    }

    async fn create(&self, ctx: &ProviderContext, config: &RecordConfig) -> Result<RecordState> {
        let zone_id = naming::clean_zone_id(&config.zone_id);
        let zone_name = Self::zone_name(ctx, &zone_id).await?;
        let record_set = config.record_set(&zone_name);

        let change = if config.allow_overwrite {
            Change::upsert(to_wire(&record_set))
        } else {
            Change::create(to_wire(&record_set))
        };

        info!(zone_id = %zone_id, record = %record_set.key(), action = %change.action, "Creating record");
        Self::submit(ctx, &zone_id, &[change]).await?;

        Ok(RecordState::new(&zone_id, &zone_name, record_set))
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<RecordState>> {
        let record_id: RecordId = id.parse()?;
        let Some(details) = found(ctx.api().get_hosted_zone(&record_id.zone_id).await)? else {
            return Ok(None);
        };
        let zone_name = naming::normalize_name(&details.zone.name);

        let key = crate::model::RecordSetKey::new(
            &record_id.name,
            record_id.record_type,
            record_id.set_identifier.as_deref(),
        );
        let record_sets = ctx.api().list_resource_record_sets(&record_id.zone_id).await?;

        Ok(record_sets
            .iter()
            .find(|rs| rs.key() == key)
            .map(|rs| RecordState::new(&record_id.zone_id, &zone_name, from_wire(rs))))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &RecordState,
        config: &RecordConfig,
    ) -> Result<RecordState> {
        let desired = config.record_set(&prior.zone_name);
        let old = &prior.record_set;

        let changes = if old.key() != desired.key() {
            info!(zone_id = %prior.zone_id, from = %old.key(), to = %desired.key(), "Moving record");
            let put = if config.allow_overwrite { Change::upsert } else { Change::create };
            vec![Change::delete(to_wire(old)), put(to_wire(&desired))]
        } else {
            info!(zone_id = %prior.zone_id, record = %desired.key(), "Updating record");
            vec![Change::upsert(to_wire(&desired))]
        };

        Self::submit(ctx, &prior.zone_id, &changes).await?;
        Ok(RecordState::new(&prior.zone_id, &prior.zone_name, desired))
    }

    async fn delete(&self, ctx: &ProviderContext, state: &RecordState) -> Result<()> {
        info!(zone_id = %state.zone_id, record = %state.record_set.key(), "Deleting record");
        let changes = [Change::delete(to_wire(&state.record_set))];
        match Self::submit(ctx, &state.zone_id, &changes).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    fn requires_replacement(&self, prior: &RecordState, config: &RecordConfig) -> bool {
        prior.zone_id != naming::clean_zone_id(&config.zone_id)
    }

    fn in_sync(&self, prior: &RecordState, config: &RecordConfig) -> bool {
        prior.zone_id == naming::clean_zone_id(&config.zone_id)
            && config.record_set(&prior.zone_name).same_contents(&prior.record_set)
    }
}
