// # CIDR Location
//
// A named set of CIDR blocks inside a collection. Blocks are applied as a
// diff: PUT_CIDR for new ones, DELETE_IF_EXISTS for dropped ones. A location
// with no blocks left no longer exists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::info;

use super::{ProviderContext, ResourceKind, found, ignore_not_found, split_id};
use crate::error::{Error, Result};
use crate::model::{CidrChangeAction, CidrCollectionChange};
use crate::traits::Resource;

/// Declared location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CidrLocationConfig {
    pub cidr_collection_id: String,
    pub name: String,
    pub cidr_blocks: Vec<String>,
}

/// Observed location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CidrLocationState {
    pub cidr_collection_id: String,
    pub name: String,
    /// Sorted
    pub cidr_blocks: Vec<String>,
}

fn valid_cidr(block: &str) -> bool {
    let Some((addr, prefix)) = block.split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    let max = if addr.is_ipv4() { 32 } else { 128 };
    prefix.parse::<u8>().is_ok_and(|p| p <= max)
}

/// Changes that bring `current` blocks to `desired`
fn block_changes(location: &str, current: &[String], desired: &[String]) -> Vec<CidrCollectionChange> {
    let current: BTreeSet<&String> = current.iter().collect();
    let desired: BTreeSet<&String> = desired.iter().collect();

    let put: Vec<String> = desired.difference(&current).map(|b| b.to_string()).collect();
    let drop: Vec<String> = current.difference(&desired).map(|b| b.to_string()).collect();

    let mut changes = Vec::new();
    if !put.is_empty() {
        changes.push(CidrCollectionChange {
            location_name: location.to_string(),
            action: CidrChangeAction::PutCidr,
            cidr_list: put,
        });
    }
    if !drop.is_empty() {
        changes.push(CidrCollectionChange {
            location_name: location.to_string(),
            action: CidrChangeAction::DeleteIfExists,
            cidr_list: drop,
        });
    }
    changes
}

fn sorted(blocks: &[String]) -> Vec<String> {
    let set: BTreeSet<&String> = blocks.iter().collect();
    set.into_iter().cloned().collect()
}

/// `cidr_location` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct CidrLocationResource;

#[async_trait]
impl Resource for CidrLocationResource {
    const KIND: ResourceKind = ResourceKind::CidrLocation;
    type Config = CidrLocationConfig;
    type State = CidrLocationState;

    fn id(&self, state: &CidrLocationState) -> String {
        format!("{},{}", state.cidr_collection_id, state.name)
    }

    fn validate(&self, config: &CidrLocationConfig) -> Result<()> {
        let name = &config.name;
        if !(1..=16).contains(&name.len())
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::invalid_input(format!(
                "CIDR location name {name:?} must be 1 to 16 letters, digits, '_' or '-'"
            )));
        }
        if config.cidr_blocks.is_empty() {
            return Err(Error::invalid_input("cidr_blocks must not be empty"));
        }
        if let Some(bad) = config.cidr_blocks.iter().find(|b| !valid_cidr(b)) {
            return Err(Error::invalid_input(format!("invalid CIDR block: {bad}")));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &CidrLocationConfig,
    ) -> Result<CidrLocationState> {
        let changes = block_changes(&config.name, &[], &config.cidr_blocks);
        info!(collection_id = %config.cidr_collection_id, location = %config.name, "Creating CIDR location");
        ctx.api()
            .change_cidr_collection(&config.cidr_collection_id, None, &changes)
            .await?;

        Ok(CidrLocationState {
            cidr_collection_id: config.cidr_collection_id.clone(),
            name: config.name.clone(),
            cidr_blocks: sorted(&config.cidr_blocks),
        })
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<CidrLocationState>> {
        let (collection_id, name) = split_id(id, ',', "CIDR location")?;
        let Some(blocks) = found(ctx.api().list_cidr_blocks(collection_id, Some(name)).await)? else {
            return Ok(None);
        };
        let blocks: Vec<String> = blocks
            .into_iter()
            .filter(|b| b.location_name == name)
            .map(|b| b.cidr_block)
            .collect();
        if blocks.is_empty() {
            return Ok(None);
        }

        Ok(Some(CidrLocationState {
            cidr_collection_id: collection_id.to_string(),
            name: name.to_string(),
            cidr_blocks: sorted(&blocks),
        }))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &CidrLocationState,
        config: &CidrLocationConfig,
    ) -> Result<CidrLocationState> {
        let changes = block_changes(&prior.name, &prior.cidr_blocks, &config.cidr_blocks);
        if !changes.is_empty() {
            info!(collection_id = %prior.cidr_collection_id, location = %prior.name, "Updating CIDR location");
            ctx.api()
                .change_cidr_collection(&prior.cidr_collection_id, None, &changes)
                .await?;
        }

        Ok(CidrLocationState {
            cidr_blocks: sorted(&config.cidr_blocks),
            ..prior.clone()
        })
    }

    async fn delete(&self, ctx: &ProviderContext, state: &CidrLocationState) -> Result<()> {
        let changes = block_changes(&state.name, &state.cidr_blocks, &[]);
        info!(collection_id = %state.cidr_collection_id, location = %state.name, "Deleting CIDR location");
        ignore_not_found(
            ctx.api()
                .change_cidr_collection(&state.cidr_collection_id, None, &changes)
                .await,
        )
    }

    fn requires_replacement(&self, prior: &CidrLocationState, config: &CidrLocationConfig) -> bool {
        prior.cidr_collection_id != config.cidr_collection_id || prior.name != config.name
    }

    fn in_sync(&self, prior: &CidrLocationState, config: &CidrLocationConfig) -> bool {
        !self.requires_replacement(prior, config) && prior.cidr_blocks == sorted(&config.cidr_blocks)
    }
}
