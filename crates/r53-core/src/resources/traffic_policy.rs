// # Traffic Policy
//
// Policies are immutable per version: a document change publishes a new
// version, the comment is editable in place. The state tracks the latest
// version.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ProviderContext, ResourceKind, found, ignore_not_found};
use crate::error::{Error, Result};
use crate::model::{RecordType, TrafficPolicy};
use crate::traits::Resource;

/// Declared traffic policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPolicyConfig {
    pub name: String,
    /// JSON policy document
    pub document: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TrafficPolicyConfig {
    /// Declared comment, with an empty comment meaning none
    fn declared_comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }
}

/// Latest version of a traffic policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPolicyState {
    pub id: String,
    pub version: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: RecordType,
    pub document: String,
    pub comment: Option<String>,
}

impl From<TrafficPolicy> for TrafficPolicyState {
    fn from(policy: TrafficPolicy) -> Self {
        Self {
            id: policy.id,
            version: policy.version,
            name: policy.name,
            policy_type: policy.policy_type,
            document: policy.document,
            comment: policy.comment.filter(|c| !c.is_empty()),
        }
    }
}

/// Compare documents as JSON, falling back to text when either side is not JSON
pub(crate) fn documents_equal(a: &str, b: &str) -> bool {
    match (
        serde_json::from_str::<serde_json::Value>(a),
        serde_json::from_str::<serde_json::Value>(b),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

/// `traffic_policy` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficPolicyResource;

#[async_trait]
impl Resource for TrafficPolicyResource {
    const KIND: ResourceKind = ResourceKind::TrafficPolicy;
    type Config = TrafficPolicyConfig;
    type State = TrafficPolicyState;

    fn id(&self, state: &TrafficPolicyState) -> String {
        state.id.clone()
    }

    fn validate(&self, config: &TrafficPolicyConfig) -> Result<()> {
        if config.name.is_empty() || config.name.len() > 512 {
            return Err(Error::invalid_input("traffic policy name must be 1 to 512 characters"));
        }
        if config.document.len() > 102_400 {
            return Err(Error::invalid_input("traffic policy document exceeds 102400 bytes"));
        }
        serde_json::from_str::<serde_json::Value>(&config.document)
            .map_err(|e| Error::invalid_input(format!("traffic policy document is not JSON: {e}")))?;
        if config.comment.as_ref().is_some_and(|c| c.len() > 1024) {
            return Err(Error::invalid_input("traffic policy comment exceeds 1024 characters"));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &TrafficPolicyConfig,
    ) -> Result<TrafficPolicyState> {
        let policy = ctx
            .api()
            .create_traffic_policy(&config.name, &config.document, config.declared_comment())
            .await?;
        info!(traffic_policy_id = %policy.id, name = %policy.name, "Created traffic policy");
        Ok(policy.into())
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<TrafficPolicyState>> {
        let Some(versions) = found(ctx.api().list_traffic_policy_versions(id).await)? else {
            return Ok(None);
        };
        Ok(versions
            .into_iter()
            .max_by_key(|p| p.version)
            .map(TrafficPolicyState::from))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &TrafficPolicyState,
        config: &TrafficPolicyConfig,
    ) -> Result<TrafficPolicyState> {
        if !documents_equal(&prior.document, &config.document) {
            let policy = ctx
                .api()
                .create_traffic_policy_version(&prior.id, &config.document, config.declared_comment())
                .await?;
            info!(traffic_policy_id = %prior.id, version = policy.version, "Published traffic policy version");
            return Ok(policy.into());
        }

        if prior.comment.as_deref() != config.declared_comment() {
            let comment = config.declared_comment().unwrap_or_default();
            let policy = ctx
                .api()
                .update_traffic_policy_comment(&prior.id, prior.version, comment)
                .await?;
            return Ok(policy.into());
        }

        Ok(prior.clone())
    }

    async fn delete(&self, ctx: &ProviderContext, state: &TrafficPolicyState) -> Result<()> {
        let Some(versions) = found(ctx.api().list_traffic_policy_versions(&state.id).await)? else {
            return Ok(());
        };
        info!(traffic_policy_id = %state.id, versions = versions.len(), "Deleting traffic policy");
        for policy in versions {
            debug!(traffic_policy_id = %state.id, version = policy.version, "Deleting traffic policy version");
            ignore_not_found(ctx.api().delete_traffic_policy(&state.id, policy.version).await)?;
        }
        Ok(())
    }

    fn requires_replacement(&self, prior: &TrafficPolicyState, config: &TrafficPolicyConfig) -> bool {
        prior.name != config.name
    }

    fn in_sync(&self, prior: &TrafficPolicyState, config: &TrafficPolicyConfig) -> bool {
        prior.name == config.name
            && prior.comment.as_deref() == config.declared_comment()
            && documents_equal(&prior.document, &config.document)
    }
}
