// # Records Exclusive
//
// Owns every record set of a hosted zone: record sets that are not declared
// are deleted, except the zone's own SOA and NS. Declared names may be
// relative to the zone and TXT/SPF values are declared unquoted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::record::{from_wire, to_wire};
use super::{ProviderContext, ResourceKind, found};
use crate::error::{Error, Result};
use crate::model::{MAX_CHANGES_PER_BATCH, ResourceRecordSet};
use crate::naming;
use crate::reconcile::diff_record_sets;
use crate::traits::Resource;
use crate::waiter;

/// Declared record sets of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsExclusiveConfig {
    pub zone_id: String,
    #[serde(default)]
    pub resource_record_sets: Vec<ResourceRecordSet>,
}

/// Every record set observed in the zone, apex included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsExclusiveState {
    pub zone_id: String,
    pub zone_name: String,
    /// Declared (unquoted) form, sorted by key
    pub resource_record_sets: Vec<ResourceRecordSet>,
}

/// `records_exclusive` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordsExclusiveResource;

impl RecordsExclusiveResource {
    fn desired(config: &RecordsExclusiveConfig, zone_name: &str) -> Vec<ResourceRecordSet> {
        config
            .resource_record_sets
            .iter()
            .map(|rs| ResourceRecordSet {
                name: naming::expand_record_name(&rs.name, zone_name),
                ..rs.clone()
            })
            .collect()
    }

    async fn observe(
        ctx: &ProviderContext,
        zone_id: &str,
    ) -> Result<Option<RecordsExclusiveState>> {
        let Some(details) = found(ctx.api().get_hosted_zone(zone_id).await)? else {
            return Ok(None);
        };
        let mut record_sets: Vec<ResourceRecordSet> = ctx
            .api()
            .list_resource_record_sets(zone_id)
            .await?
            .iter()
            .map(from_wire)
            .collect();
        record_sets.sort_by_key(|rs| rs.key());

        Ok(Some(RecordsExclusiveState {
            zone_id: zone_id.to_string(),
            zone_name: naming::normalize_name(&details.zone.name),
            resource_record_sets: record_sets,
        }))
    }

    async fn reconcile(
        ctx: &ProviderContext,
        config: &RecordsExclusiveConfig,
    ) -> Result<RecordsExclusiveState> {
        let zone_id = naming::clean_zone_id(&config.zone_id);
        let current = Self::observe(ctx, &zone_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("hosted zone {zone_id}")))?;

        let desired = Self::desired(config, &current.zone_name);
        let diff = diff_record_sets(&current.zone_name, &current.resource_record_sets, &desired);
        if diff.is_empty() {
            return Ok(current);
        }
        if diff.len() > MAX_CHANGES_PER_BATCH {
            return Err(Error::invalid_input(format!(
                "{} record set changes exceed the {MAX_CHANGES_PER_BATCH} change batch limit",
                diff.len()
            )));
        }

        info!(
            zone_id = %zone_id,
            add = diff.add.len(),
            remove = diff.remove.len(),
            modify = diff.modify.len(),
            "Reconciling zone records"
        );
        let changes: Vec<_> = diff
            .into_changes()
            .into_iter()
            .map(|mut change| {
                change.record_set = to_wire(&change.record_set);
                change
            })
            .collect();

        let change = ctx
            .api()
            .change_resource_record_sets(&zone_id, Some("Managed by r53"), &changes)
            .await?;
        waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.records_exclusive())
            .await?;

        Self::observe(ctx, &zone_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("hosted zone {zone_id}")))
    }
}

#[async_trait]
impl Resource for RecordsExclusiveResource {
    const KIND: ResourceKind = ResourceKind::RecordsExclusive;
    type Config = RecordsExclusiveConfig;
    type State = RecordsExclusiveState;

    fn id(&self, state: &RecordsExclusiveState) -> String {
        state.zone_id.clone()
    }

    fn validate(&self, config: &RecordsExclusiveConfig) -> Result<()> {
        for rs in &config.resource_record_sets {
            if rs.name.is_empty() {
                return Err(Error::invalid_input("record set name must not be empty"));
            }
            match (rs.records.is_empty(), rs.alias.is_some()) {
                (false, false) | (true, true) => {}
                _ => {
                    return Err(Error::invalid_input(format!(
                        "record set {} must have exactly one of records or alias",
                        rs.key()
                    )));
                }
            }
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &RecordsExclusiveConfig,
    ) -> Result<RecordsExclusiveState> {
        Self::reconcile(ctx, config).await
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<RecordsExclusiveState>> {
        Self::observe(ctx, &naming::clean_zone_id(id)).await
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &RecordsExclusiveState,
        config: &RecordsExclusiveConfig,
    ) -> Result<RecordsExclusiveState> {
        Self::reconcile(ctx, config).await
    }

    async fn delete(&self, _ctx: &ProviderContext, state: &RecordsExclusiveState) -> Result<()> {
        // record sets are left in place; only ownership ends
        info!(zone_id = %state.zone_id, "Releasing exclusive ownership of zone records");
        Ok(())
    }

    fn requires_replacement(
        &self,
        prior: &RecordsExclusiveState,
        config: &RecordsExclusiveConfig,
    ) -> bool {
        prior.zone_id != naming::clean_zone_id(&config.zone_id)
    }

    fn in_sync(&self, prior: &RecordsExclusiveState, config: &RecordsExclusiveConfig) -> bool {
        let desired = Self::desired(config, &prior.zone_name);
        prior.zone_id == naming::clean_zone_id(&config.zone_id)
            && diff_record_sets(&prior.zone_name, &prior.resource_record_sets, &desired).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordType;

    fn state() -> RecordsExclusiveState {
        RecordsExclusiveState {
            zone_id: "Z1".into(),
            zone_name: "example.com".into(),
            resource_record_sets: vec![
                ResourceRecordSet::simple("example.com", RecordType::Ns, 172800, vec!["ns1.".into()]),
                ResourceRecordSet::simple("example.com", RecordType::Soa, 900, vec!["soa".into()]),
                ResourceRecordSet::simple("www.example.com", RecordType::A, 300, vec!["192.0.2.1".into()]),
            ],
        }
    }

    fn config(sets: Vec<ResourceRecordSet>) -> RecordsExclusiveConfig {
        RecordsExclusiveConfig {
            zone_id: "/hostedzone/Z1".into(),
            resource_record_sets: sets,
        }
    }

    #[test]
    fn test_in_sync_with_relative_names() {
        let c = config(vec![ResourceRecordSet::simple(
            "www",
            RecordType::A,
            300,
            vec!["192.0.2.1".into()],
        )]);
        assert!(RecordsExclusiveResource.in_sync(&state(), &c));
    }

    #[test]
    fn test_validate_requires_records_or_alias() {
        let plain = ResourceRecordSet::simple("www", RecordType::A, 300, vec!["192.0.2.1".into()]);
        assert!(RecordsExclusiveResource.validate(&config(vec![plain.clone()])).is_ok());

        let empty = ResourceRecordSet { records: vec![], ..plain };
        assert!(RecordsExclusiveResource.validate(&config(vec![empty])).is_err());
    }

    #[test]
    fn test_undeclared_record_is_drift() {
        let c = config(vec![]);
        assert!(!RecordsExclusiveResource.in_sync(&state(), &c));
    }

    #[test]
    fn test_zone_change_replaces() {
        let mut c = config(vec![]);
        assert!(!RecordsExclusiveResource.requires_replacement(&state(), &c));
        c.zone_id = "Z2".into();
        assert!(RecordsExclusiveResource.requires_replacement(&state(), &c));
    }
}
