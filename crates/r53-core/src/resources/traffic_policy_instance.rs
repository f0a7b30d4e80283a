// # Traffic Policy Instance
//
// Applies a traffic policy version at a name in a hosted zone. Route 53
// builds the records asynchronously; create and update wait for `Applied`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, found};
use crate::error::{Error, Result};
use crate::model::{CreateTrafficPolicyInstanceRequest, TrafficPolicyInstance};
use crate::naming;
use crate::traits::Resource;
use crate::waiter;

/// Declared instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPolicyInstanceConfig {
    pub hosted_zone_id: String,
    pub name: String,
    pub ttl: i64,
    pub traffic_policy_id: String,
    pub traffic_policy_version: i32,
}

/// Observed instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPolicyInstanceState {
    pub id: String,
    pub hosted_zone_id: String,
    pub name: String,
    pub ttl: i64,
    pub traffic_policy_id: String,
    pub traffic_policy_version: i32,
}

impl From<TrafficPolicyInstance> for TrafficPolicyInstanceState {
    fn from(instance: TrafficPolicyInstance) -> Self {
        Self {
            id: instance.id,
            hosted_zone_id: naming::clean_zone_id(&instance.hosted_zone_id),
            name: naming::normalize_name(&instance.name),
            ttl: instance.ttl,
            traffic_policy_id: instance.traffic_policy_id,
            traffic_policy_version: instance.traffic_policy_version,
        }
    }
}

/// `traffic_policy_instance` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficPolicyInstanceResource;

#[async_trait]
impl Resource for TrafficPolicyInstanceResource {
    const KIND: ResourceKind = ResourceKind::TrafficPolicyInstance;
    type Config = TrafficPolicyInstanceConfig;
    type State = TrafficPolicyInstanceState;

    fn id(&self, state: &TrafficPolicyInstanceState) -> String {
        state.id.clone()
    }

    fn validate(&self, config: &TrafficPolicyInstanceConfig) -> Result<()> {
        if config.name.is_empty() {
            return Err(Error::invalid_input("traffic policy instance name must not be empty"));
        }
        if !(0..=2_147_483_647).contains(&config.ttl) {
            return Err(Error::invalid_input("ttl must be between 0 and 2147483647"));
        }
        if config.traffic_policy_version < 1 {
            return Err(Error::invalid_input("traffic_policy_version must be at least 1"));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &TrafficPolicyInstanceConfig,
    ) -> Result<TrafficPolicyInstanceState> {
        let request = CreateTrafficPolicyInstanceRequest {
            hosted_zone_id: naming::clean_zone_id(&config.hosted_zone_id),
            name: naming::normalize_name(&config.name),
            ttl: config.ttl,
            traffic_policy_id: config.traffic_policy_id.clone(),
            traffic_policy_version: config.traffic_policy_version,
        };
        let instance = ctx.api().create_traffic_policy_instance(&request).await?;
        info!(instance_id = %instance.id, name = %request.name, "Created traffic policy instance");

        let applied = waiter::wait_for_traffic_policy_instance(
            ctx.api(),
            &instance.id,
            &ctx.timeouts.traffic_policy_instance(),
        )
        .await
        .map_err(|e| Error::incomplete("traffic policy instance", &instance.id, e))?;
        Ok(applied.into())
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        id: &str,
    ) -> Result<Option<TrafficPolicyInstanceState>> {
        Ok(found(ctx.api().get_traffic_policy_instance(id).await)?.map(Into::into))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &TrafficPolicyInstanceState,
        config: &TrafficPolicyInstanceConfig,
    ) -> Result<TrafficPolicyInstanceState> {
        info!(
            instance_id = %prior.id,
            policy = %config.traffic_policy_id,
            version = config.traffic_policy_version,
            "Updating traffic policy instance"
        );
        ctx.api()
            .update_traffic_policy_instance(
                &prior.id,
                config.ttl,
                &config.traffic_policy_id,
                config.traffic_policy_version,
            )
            .await?;

        let applied = waiter::wait_for_traffic_policy_instance(
            ctx.api(),
            &prior.id,
            &ctx.timeouts.traffic_policy_instance(),
        )
        .await?;
        Ok(applied.into())
    }

    async fn delete(&self, ctx: &ProviderContext, state: &TrafficPolicyInstanceState) -> Result<()> {
        info!(instance_id = %state.id, "Deleting traffic policy instance");
        match ctx.api().delete_traffic_policy_instance(&state.id).await {
            Err(e) if e.is_not_found() => return Ok(()),
            other => other?,
        }
        waiter::wait_for_traffic_policy_instance_deleted(
            ctx.api(),
            &state.id,
            &ctx.timeouts.traffic_policy_instance(),
        )
        .await
    }

    fn requires_replacement(
        &self,
        prior: &TrafficPolicyInstanceState,
        config: &TrafficPolicyInstanceConfig,
    ) -> bool {
        prior.hosted_zone_id != naming::clean_zone_id(&config.hosted_zone_id)
            || prior.name != naming::normalize_name(&config.name)
    }

    fn in_sync(&self, prior: &TrafficPolicyInstanceState, config: &TrafficPolicyInstanceConfig) -> bool {
        !self.requires_replacement(prior, config)
            && prior.ttl == config.ttl
            && prior.traffic_policy_id == config.traffic_policy_id
            && prior.traffic_policy_version == config.traffic_policy_version
    }
}
