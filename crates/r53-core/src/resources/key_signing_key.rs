// # Key Signing Key
//
// A KSK wraps an asymmetric KMS key. Only ACTIVE and INACTIVE can be
// declared; an active key is deactivated before it is deleted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, caller_reference, found, split_id};
use crate::error::{Error, Result};
use crate::model::{ChangeInfo, CreateKeySigningKeyRequest, KeySigningKey, KeySigningKeyStatus};
use crate::naming;
use crate::traits::Resource;
use crate::waiter;

fn default_status() -> KeySigningKeyStatus {
    KeySigningKeyStatus::Active
}

/// Declared key-signing key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySigningKeyConfig {
    pub hosted_zone_id: String,
    pub name: String,
    pub key_management_service_arn: String,
    #[serde(default = "default_status")]
    pub status: KeySigningKeyStatus,
}

/// Observed key-signing key with its DS/DNSKEY material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySigningKeyState {
    pub hosted_zone_id: String,
    #[serde(flatten)]
    pub key: KeySigningKey,
}

/// `key_signing_key` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct KeySigningKeyResource;

impl KeySigningKeyResource {
    async fn settle(
        ctx: &ProviderContext,
        zone_id: &str,
        name: &str,
        change: &ChangeInfo,
        target: KeySigningKeyStatus,
    ) -> Result<KeySigningKey> {
        let wait = ctx.timeouts.key_signing_key();
        waiter::wait_for_change_insync(ctx.api(), change, &wait).await?;
        waiter::wait_for_key_signing_key_status(ctx.api(), zone_id, name, target, &wait).await
    }
}

#[async_trait]
impl Resource for KeySigningKeyResource {
    const KIND: ResourceKind = ResourceKind::KeySigningKey;
    type Config = KeySigningKeyConfig;
    type State = KeySigningKeyState;

    fn id(&self, state: &KeySigningKeyState) -> String {
        format!("{},{}", state.hosted_zone_id, state.key.name)
    }

    fn validate(&self, config: &KeySigningKeyConfig) -> Result<()> {
        let name = &config.name;
        if !(3..=128).contains(&name.len())
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::invalid_input(format!(
                "key signing key name {name:?} must be 3 to 128 letters, digits or underscores"
            )));
        }
        if !config.key_management_service_arn.starts_with("arn:") {
            return Err(Error::invalid_input("key_management_service_arn must be an ARN"));
        }
        if !matches!(config.status, KeySigningKeyStatus::Active | KeySigningKeyStatus::Inactive) {
            return Err(Error::invalid_input("status must be ACTIVE or INACTIVE"));
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &KeySigningKeyConfig,
    ) -> Result<KeySigningKeyState> {
        let zone_id = naming::clean_zone_id(&config.hosted_zone_id);
        let request = CreateKeySigningKeyRequest {
            hosted_zone_id: zone_id.clone(),
            name: config.name.clone(),
            kms_arn: config.key_management_service_arn.clone(),
            status: config.status,
            caller_reference: caller_reference("ksk"),
        };

        info!(zone_id = %zone_id, name = %config.name, "Creating key signing key");
        let (_, change) = ctx.api().create_key_signing_key(&request).await?;
        let key = Self::settle(ctx, &zone_id, &config.name, &change, config.status)
            .await
            .map_err(|e| Error::incomplete("key signing key", format!("{zone_id},{}", config.name), e))?;

        Ok(KeySigningKeyState { hosted_zone_id: zone_id, key })
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<KeySigningKeyState>> {
        let (zone, name) = split_id(id, ',', "key signing key")?;
        let zone_id = naming::clean_zone_id(zone);
        let Some(info) = found(ctx.api().get_dnssec(&zone_id).await)? else {
            return Ok(None);
        };

        Ok(info.key(name).cloned().map(|key| KeySigningKeyState {
            hosted_zone_id: zone_id,
            key,
        }))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &KeySigningKeyState,
        config: &KeySigningKeyConfig,
    ) -> Result<KeySigningKeyState> {
        if prior.key.status == config.status {
            return Ok(prior.clone());
        }

        let zone_id = &prior.hosted_zone_id;
        let name = &prior.key.name;
        info!(zone_id = %zone_id, name = %name, status = %config.status, "Changing key signing key status");
        let change = match config.status {
            KeySigningKeyStatus::Active => ctx.api().activate_key_signing_key(zone_id, name).await?,
            _ => ctx.api().deactivate_key_signing_key(zone_id, name).await?,
        };
        let key = Self::settle(ctx, zone_id, name, &change, config.status).await?;

        Ok(KeySigningKeyState { hosted_zone_id: zone_id.clone(), key })
    }

    async fn delete(&self, ctx: &ProviderContext, state: &KeySigningKeyState) -> Result<()> {
        let zone_id = &state.hosted_zone_id;
        let name = &state.key.name;

        if state.key.status == KeySigningKeyStatus::Active {
            info!(zone_id = %zone_id, name = %name, "Deactivating key signing key before deletion");
            match ctx.api().deactivate_key_signing_key(zone_id, name).await {
                Ok(change) => {
                    Self::settle(ctx, zone_id, name, &change, KeySigningKeyStatus::Inactive).await?;
                }
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
            }
        }

        info!(zone_id = %zone_id, name = %name, "Deleting key signing key");
        match ctx.api().delete_key_signing_key(zone_id, name).await {
            Ok(change) => {
                waiter::wait_for_change_insync(ctx.api(), &change, &ctx.timeouts.key_signing_key())
                    .await?;
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn requires_replacement(&self, prior: &KeySigningKeyState, config: &KeySigningKeyConfig) -> bool {
        prior.hosted_zone_id != naming::clean_zone_id(&config.hosted_zone_id)
            || prior.key.name != config.name
            || prior.key.kms_arn != config.key_management_service_arn
    }

    fn in_sync(&self, prior: &KeySigningKeyState, config: &KeySigningKeyConfig) -> bool {
        !self.requires_replacement(prior, config) && prior.key.status == config.status
    }
}
