// # Health Check
//
// Endpoint, calculated, CloudWatch alarm and recovery control checks. Updates
// carry the version last read so that concurrent edits are rejected by
// Route 53 instead of silently overwritten.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ProviderContext, ResourceKind, caller_reference, found, ignore_not_found, sync_tags};
use crate::error::{Error, Result};
use crate::model::{HealthCheck, HealthCheckConfig, HealthCheckType, TaggableResource, Tags};
use crate::naming;
use crate::traits::Resource;

/// Declared health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResourceConfig {
    #[serde(flatten)]
    pub check: HealthCheckConfig,
    #[serde(default)]
    pub tags: Tags,
}

/// Observed health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckState {
    pub id: String,
    pub arn: String,
    pub caller_reference: String,
    pub version: i64,
    pub check: HealthCheckConfig,
    pub tags: Tags,
}

impl HealthCheckState {
    fn new(check: HealthCheck, tags: Tags) -> Self {
        let id = naming::clean_health_check_id(&check.id);
        Self {
            arn: format!("arn:aws:route53:::healthcheck/{id}"),
            id,
            caller_reference: check.caller_reference,
            version: check.version,
            check: check.config,
            tags,
        }
    }
}

/// Unset optional settings match whatever Route 53 defaulted them to
fn declared<T: PartialEq>(declared: &Option<T>, observed: &Option<T>) -> bool {
    declared.is_none() || declared == observed
}

fn same_set(declared: &[String], observed: &[String]) -> bool {
    let mut a = declared.to_vec();
    let mut b = observed.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Whether the observed settings satisfy the declared ones
fn check_matches(want: &HealthCheckConfig, have: &HealthCheckConfig) -> bool {
    want.check_type == have.check_type
        && declared(&want.fqdn, &have.fqdn)
        && declared(&want.ip_address, &have.ip_address)
        && declared(&want.port, &have.port)
        && declared(&want.resource_path, &have.resource_path)
        && declared(&want.search_string, &have.search_string)
        && declared(&want.request_interval, &have.request_interval)
        && declared(&want.failure_threshold, &have.failure_threshold)
        && declared(&want.enable_sni, &have.enable_sni)
        && declared(&want.health_threshold, &have.health_threshold)
        && declared(&want.cloudwatch_alarm, &have.cloudwatch_alarm)
        && declared(&want.insufficient_data_health_status, &have.insufficient_data_health_status)
        && declared(&want.routing_control_arn, &have.routing_control_arn)
        && want.measure_latency == have.measure_latency
        && want.inverted == have.inverted
        && want.disabled == have.disabled
        && (want.regions.is_empty() || same_set(&want.regions, &have.regions))
        && same_set(&want.child_health_checks, &have.child_health_checks)
}

/// `health_check` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthCheckResource;

#[async_trait]
impl Resource for HealthCheckResource {
    const KIND: ResourceKind = ResourceKind::HealthCheck;
    type Config = HealthCheckResourceConfig;
    type State = HealthCheckState;

    fn id(&self, state: &HealthCheckState) -> String {
        state.id.clone()
    }

    fn validate(&self, config: &HealthCheckResourceConfig) -> Result<()> {
        let check = &config.check;
        let kind = check.check_type;

        if kind.is_endpoint_check() {
            if check.fqdn.is_none() && check.ip_address.is_none() {
                return Err(Error::invalid_input(format!(
                    "{kind} health checks need fqdn or ip_address"
                )));
            }
            if check.failure_threshold.is_some_and(|t| !(1..=10).contains(&t)) {
                return Err(Error::invalid_input("failure_threshold must be between 1 and 10"));
            }
            if check.request_interval.is_some_and(|i| i != 10 && i != 30) {
                return Err(Error::invalid_input("request_interval must be 10 or 30"));
            }
            if check.port.is_some_and(|p| !(1..=65535).contains(&p)) {
                return Err(Error::invalid_input("port must be between 1 and 65535"));
            }
            if !check.regions.is_empty() && check.regions.len() < 3 {
                return Err(Error::invalid_input("at least 3 checker regions are required"));
            }
        } else if check.fqdn.is_some() || check.ip_address.is_some() || check.port.is_some() {
            return Err(Error::invalid_input(format!(
                "{kind} health checks take no endpoint"
            )));
        }

        if kind.is_string_match() {
            match &check.search_string {
                None => {
                    return Err(Error::invalid_input(format!("{kind} health checks need search_string")));
                }
                Some(s) if s.len() > 255 => {
                    return Err(Error::invalid_input("search_string must be at most 255 bytes"));
                }
                Some(_) => {}
            }
        } else if check.search_string.is_some() {
            return Err(Error::invalid_input(format!(
                "search_string is only valid for string-match checks, not {kind}"
            )));
        }

        if check.resource_path.as_ref().is_some_and(|p| p.len() > 255) {
            return Err(Error::invalid_input("resource_path must be at most 255 bytes"));
        }
        if check.enable_sni == Some(true)
            && !matches!(kind, HealthCheckType::Https | HealthCheckType::HttpsStrMatch)
        {
            return Err(Error::invalid_input("enable_sni is only valid for HTTPS checks"));
        }

        match kind {
            HealthCheckType::Calculated => {
                if check.health_threshold.is_some_and(|t| !(0..=256).contains(&t)) {
                    return Err(Error::invalid_input("health_threshold must be between 0 and 256"));
                }
            }
            HealthCheckType::CloudwatchMetric => {
                if check.cloudwatch_alarm.is_none() || check.insufficient_data_health_status.is_none() {
                    return Err(Error::invalid_input(
                        "CLOUDWATCH_METRIC checks need cloudwatch_alarm and insufficient_data_health_status",
                    ));
                }
            }
            HealthCheckType::RecoveryControl => {
                if check.routing_control_arn.is_none() {
                    return Err(Error::invalid_input("RECOVERY_CONTROL checks need routing_control_arn"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        config: &HealthCheckResourceConfig,
    ) -> Result<HealthCheckState> {
        let reference = caller_reference("hc");
        let check = ctx.api().create_health_check(&reference, &config.check).await?;
        let id = naming::clean_health_check_id(&check.id);
        info!(health_check_id = %id, check_type = %config.check.check_type, "Created health check");

        sync_tags(ctx.api(), TaggableResource::HealthCheck, &id, &Tags::new(), &config.tags)
            .await
            .map_err(|e| Error::incomplete("health check", &id, e))?;
        Ok(HealthCheckState::new(check, config.tags.clone()))
    }

    async fn read(&self, ctx: &ProviderContext, id: &str) -> Result<Option<HealthCheckState>> {
        let id = naming::clean_health_check_id(id);
        let Some(check) = found(ctx.api().get_health_check(&id).await)? else {
            return Ok(None);
        };
        let tags = ctx.api().list_tags(TaggableResource::HealthCheck, &id).await?;
        Ok(Some(HealthCheckState::new(check, tags)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &HealthCheckState,
        config: &HealthCheckResourceConfig,
    ) -> Result<HealthCheckState> {
        let check = if check_matches(&config.check, &prior.check) {
            HealthCheck {
                id: prior.id.clone(),
                caller_reference: prior.caller_reference.clone(),
                version: prior.version,
                config: prior.check.clone(),
            }
        } else {
            info!(health_check_id = %prior.id, version = prior.version, "Updating health check");
            ctx.api()
                .update_health_check(&prior.id, prior.version, &config.check)
                .await?
        };

        sync_tags(ctx.api(), TaggableResource::HealthCheck, &prior.id, &prior.tags, &config.tags)
            .await?;
        Ok(HealthCheckState::new(check, config.tags.clone()))
    }

    async fn delete(&self, ctx: &ProviderContext, state: &HealthCheckState) -> Result<()> {
        info!(health_check_id = %state.id, "Deleting health check");
        ignore_not_found(ctx.api().delete_health_check(&state.id).await)
    }

    fn requires_replacement(
        &self,
        prior: &HealthCheckState,
        config: &HealthCheckResourceConfig,
    ) -> bool {
        let (want, have) = (&config.check, &prior.check);
        want.check_type != have.check_type
            || !declared(&want.request_interval, &have.request_interval)
            || want.measure_latency != have.measure_latency
            || want.routing_control_arn != have.routing_control_arn
    }

    fn in_sync(&self, prior: &HealthCheckState, config: &HealthCheckResourceConfig) -> bool {
        check_matches(&config.check, &prior.check) && prior.tags == config.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> HealthCheckResourceConfig {
        let mut check = HealthCheckConfig::new(HealthCheckType::Http);
        check.fqdn = Some("example.com".into());
        check.resource_path = Some("/health".into());
        HealthCheckResourceConfig { check, tags: Tags::new() }
    }

    fn observed(config: &HealthCheckResourceConfig) -> HealthCheckState {
        let mut check = config.check.clone();
        check.port = Some(80);
        check.request_interval = Some(30);
        check.failure_threshold = Some(3);
        HealthCheckState::new(
            HealthCheck {
                id: "abc".into(),
                caller_reference: "hc-1".into(),
                version: 1,
                config: check,
            },
            config.tags.clone(),
        )
    }

    #[test]
    fn test_config_flattens_check() {
        let json = serde_json::json!({
            "type": "HTTPS_STR_MATCH",
            "fqdn": "example.com",
            "search_string": "ok",
            "tags": {"env": "prod"}
        });
        let config: HealthCheckResourceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.check.check_type, HealthCheckType::HttpsStrMatch);
        assert_eq!(config.tags.get("env").map(String::as_str), Some("prod"));
        assert!(HealthCheckResource.validate(&config).is_ok());
    }

    #[test]
    fn test_endpoint_check_needs_target() {
        let mut c = http();
        c.check.fqdn = None;
        assert!(HealthCheckResource.validate(&c).is_err());
    }

    #[test]
    fn test_string_match_needs_search_string() {
        let mut c = http();
        c.check.check_type = HealthCheckType::HttpStrMatch;
        assert!(HealthCheckResource.validate(&c).is_err());
    }

    #[test]
    fn test_calculated_rejects_endpoint() {
        let mut c = http();
        c.check.check_type = HealthCheckType::Calculated;
        assert!(HealthCheckResource.validate(&c).is_err());

        c.check.fqdn = None;
        c.check.resource_path = None;
        c.check.child_health_checks = vec!["a".into(), "b".into()];
        c.check.health_threshold = Some(1);
        assert!(HealthCheckResource.validate(&c).is_ok());
    }

    #[test]
    fn test_request_interval_values() {
        let mut c = http();
        c.check.request_interval = Some(15);
        assert!(HealthCheckResource.validate(&c).is_err());
    }

    #[test]
    fn test_defaulted_fields_stay_in_sync() {
        let c = http();
        let state = observed(&c);
        assert!(HealthCheckResource.in_sync(&state, &c));

        let mut changed = c.clone();
        changed.check.failure_threshold = Some(5);
        assert!(!HealthCheckResource.in_sync(&state, &changed));
        assert!(!HealthCheckResource.requires_replacement(&state, &changed));
    }

    #[test]
    fn test_type_and_interval_force_replacement() {
        let c = http();
        let state = observed(&c);

        let mut tcp = c.clone();
        tcp.check.check_type = HealthCheckType::Tcp;
        assert!(HealthCheckResource.requires_replacement(&state, &tcp));

        let mut fast = c.clone();
        fast.check.request_interval = Some(10);
        assert!(HealthCheckResource.requires_replacement(&state, &fast));
    }

    #[test]
    fn test_arn_from_id() {
        let state = observed(&http());
        assert_eq!(state.arn, "arn:aws:route53:::healthcheck/abc");
    }
}
