//! Kind-based dispatch
//!
//! The engine only sees JSON configs and states; this module maps a
//! [`ResourceKind`] to its typed [`Resource`] and does the conversions.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::resources::{
    CidrCollectionResource, CidrLocationResource, HealthCheckResource, HostedZoneDnssecResource,
    KeySigningKeyResource, ProviderContext, RecordResource, RecordsExclusiveResource,
    ResourceKind, TrafficPolicyInstanceResource, TrafficPolicyResource, ZoneAssociationResource,
    ZoneResource,
};
use crate::traits::Resource;

/// Remote ID and serialized state of a managed object
pub(crate) type Observed = (String, Value);

/// [`Resource`] with configs and states as JSON
#[async_trait]
pub(crate) trait DynResource: Send + Sync {
    fn validate(&self, config: &Value) -> Result<()>;
    async fn create(&self, ctx: &ProviderContext, config: &Value) -> Result<Observed>;
    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<Observed>>;
    async fn update(&self, ctx: &ProviderContext, prior: &Value, config: &Value) -> Result<Observed>;
    async fn delete(&self, ctx: &ProviderContext, prior: &Value) -> Result<()>;
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Observed>;
    fn keep_local(&self, stored: &Value, observed: Observed) -> Result<Observed>;
    fn requires_replacement(&self, prior: &Value, config: &Value) -> Result<bool>;
    fn in_sync(&self, prior: &Value, config: &Value) -> Result<bool>;
}

struct Typed<R>(R);

impl<R: Resource> Typed<R> {
    fn config(&self, config: &Value) -> Result<R::Config> {
        serde_json::from_value(config.clone())
            .map_err(|e| Error::config(format!("Invalid {} config: {e}", R::KIND)))
    }

    fn state(&self, state: &Value) -> Result<R::State> {
        serde_json::from_value(state.clone())
            .map_err(|e| Error::state_store(format!("Unreadable {} state: {e}", R::KIND)))
    }

    fn observed(&self, state: &R::State) -> Result<Observed> {
        Ok((self.0.id(state), serde_json::to_value(state)?))
    }
}

#[async_trait]
impl<R: Resource> DynResource for Typed<R> {
    fn validate(&self, config: &Value) -> Result<()> {
        self.0.validate(&self.config(config)?)
    }

    async fn create(&self, ctx: &ProviderContext, config: &Value) -> Result<Observed> {
        let config = self.config(config)?;
        let state = self.0.create(ctx, &config).await?;
        self.observed(&state)
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<Observed>> {
        match self.0.read(ctx, id).await? {
            Some(state) => Ok(Some(self.observed(&state)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, ctx: &ProviderContext, prior: &Value, config: &Value) -> Result<Observed> {
        let prior = self.state(prior)?;
        let config = self.config(config)?;
        let state = self.0.update(ctx, &prior, &config).await?;
        self.observed(&state)
    }

    async fn delete(&self, ctx: &ProviderContext, prior: &Value) -> Result<()> {
        let prior = self.state(prior)?;
        self.0.delete(ctx, &prior).await
    }

    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Observed> {
        let state = self.0.import(ctx, id).await?;
        self.observed(&state)
    }

    fn keep_local(&self, stored: &Value, (id, observed): Observed) -> Result<Observed> {
        if stored.is_null() {
            return Ok((id, observed));
        }
        let state = self.0.keep_local(&self.state(stored)?, self.state(&observed)?);
        Ok((id, serde_json::to_value(state)?))
    }

    fn requires_replacement(&self, prior: &Value, config: &Value) -> Result<bool> {
        Ok(self.0.requires_replacement(&self.state(prior)?, &self.config(config)?))
    }

    fn in_sync(&self, prior: &Value, config: &Value) -> Result<bool> {
        Ok(self.0.in_sync(&self.state(prior)?, &self.config(config)?))
    }
}

/// The resource implementation for a kind
pub(crate) fn resource_for(kind: ResourceKind) -> Box<dyn DynResource> {
    match kind {
        ResourceKind::Zone => Box::new(Typed(ZoneResource)),
        ResourceKind::ZoneAssociation => Box::new(Typed(ZoneAssociationResource)),
        ResourceKind::Record => Box::new(Typed(RecordResource)),
        ResourceKind::RecordsExclusive => Box::new(Typed(RecordsExclusiveResource)),
        ResourceKind::HealthCheck => Box::new(Typed(HealthCheckResource)),
        ResourceKind::TrafficPolicy => Box::new(Typed(TrafficPolicyResource)),
        ResourceKind::TrafficPolicyInstance => Box::new(Typed(TrafficPolicyInstanceResource)),
        ResourceKind::KeySigningKey => Box::new(Typed(KeySigningKeyResource)),
        ResourceKind::HostedZoneDnssec => Box::new(Typed(HostedZoneDnssecResource)),
        ResourceKind::CidrCollection => Box::new(Typed(CidrCollectionResource)),
        ResourceKind::CidrLocation => Box::new(Typed(CidrLocationResource)),
    }
}
