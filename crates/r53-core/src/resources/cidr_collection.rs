use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, caller_reference, ignore_not_found};
use crate::error::{Error, Result};
use crate::model::CidrCollection;
use crate::traits::Resource;

/// Declared CIDR collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CidrCollectionConfig {
    pub name: String,
}

/// Observed CIDR collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CidrCollectionState {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: i64,
}

impl From<CidrCollection> for CidrCollectionState {
    fn from(c: CidrCollection) -> Self {
        Self {
            id: c.id,
            arn: c.arn,
            name: c.name,
            version: c.version,
        }
    }
}

/// `cidr_collection` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct CidrCollectionResource;

#[async_trait]
impl Resource for CidrCollectionResource {
    const KIND: ResourceKind = ResourceKind::CidrCollection;
    type Config = CidrCollectionConfig;
    type State = CidrCollectionState;

    fn id(&self, state: &CidrCollectionState) -> String {
        state.id.clone()
    }

    fn validate(&self, config: &CidrCollectionConfig) -> Result<()> {
        let name = &config.name;
        if !(1..=64).contains(&name.len())
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::invalid_input(format!(
                "CIDR collection name {name:?} must be 1 to 64 letters, digits, '_' or '-'"
            )));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &CidrCollectionConfig,
    ) -> Result<CidrCollectionState> {
        let collection = ctx
            .api()
            .create_cidr_collection(&config.name, &caller_reference("cidr"))
            .await?;
        info!(collection_id = %collection.id, name = %collection.name, "Created CIDR collection");
        Ok(collection.into())
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<CidrCollectionState>> {
        let collections = ctx.api().list_cidr_collections().await?;
        Ok(collections.into_iter().find(|c| c.id == id).map(Into::into))
    }

    async fn update(
        &self,
        _ctx: &ProviderContext,
        prior: &CidrCollectionState,
        _config: &CidrCollectionConfig,
    ) -> Result<CidrCollectionState> {
        Ok(prior.clone())
    }

    async fn delete(&self, ctx: &ProviderContext, state: &CidrCollectionState) -> Result<()> {
        info!(collection_id = %state.id, "Deleting CIDR collection");
        ignore_not_found(ctx.api().delete_cidr_collection(&state.id).await)
    }

    fn requires_replacement(&self, prior: &CidrCollectionState, config: &CidrCollectionConfig) -> bool {
        prior.name != config.name
    }

    fn in_sync(&self, prior: &CidrCollectionState, config: &CidrCollectionConfig) -> bool {
        prior.name == config.name
    }
}
