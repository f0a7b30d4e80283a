// Conversions between aws-sdk-route53 shapes and the r53-core model.
//
// SDK IDs carry path prefixes (`/hostedzone/Z1`, `/change/C1`); the model
// never does.

use aws_sdk_route53::primitives::DateTime;
use aws_sdk_route53::types as sdk;
use r53_core::model::{
    AliasTarget, AlarmIdentifier, Change, ChangeAction, ChangeInfo, CidrBlock, CidrCollection,
    CidrCollectionChange, CidrRoutingConfig, Coordinates, Failover, GeoLocation,
    GeoProximityLocation, HealthCheck, HealthCheckConfig, HostedZone, InsufficientDataHealthStatus,
    KeySigningKey, ResourceRecordSet, TrafficPolicy, TrafficPolicyInstance, Vpc,
};
use r53_core::{Result, naming};

use crate::error::{build_error, missing};

fn timestamp(value: &DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

pub(crate) fn change_info(info: &sdk::ChangeInfo) -> Result<ChangeInfo> {
    Ok(ChangeInfo {
        id: naming::clean_change_id(info.id()),
        status: info.status().as_str().parse()?,
        submitted_at: timestamp(info.submitted_at()),
        comment: info.comment().map(str::to_string),
    })
}

pub(crate) fn hosted_zone(zone: &sdk::HostedZone) -> HostedZone {
    let config = zone.config();
    HostedZone {
        id: naming::clean_zone_id(zone.id()),
        name: zone.name().to_string(),
        caller_reference: zone.caller_reference().to_string(),
        comment: config.and_then(|c| c.comment()).map(str::to_string),
        private_zone: config.is_some_and(|c| c.private_zone()),
        resource_record_set_count: zone.resource_record_set_count().unwrap_or_default(),
    }
}

pub(crate) fn vpc_to_sdk(vpc: &Vpc) -> sdk::Vpc {
    sdk::Vpc::builder()
        .vpc_id(&vpc.vpc_id)
        .set_vpc_region(vpc.vpc_region.as_deref().map(sdk::VpcRegion::from))
        .build()
}

pub(crate) fn vpc(vpc: &sdk::Vpc) -> Vpc {
    Vpc {
        vpc_id: vpc.vpc_id().unwrap_or_default().to_string(),
        vpc_region: vpc.vpc_region().map(|r| r.as_str().to_string()),
    }
}

// --- record sets ---

pub(crate) fn record_set_to_sdk(rs: &ResourceRecordSet) -> Result<sdk::ResourceRecordSet> {
    let records = rs
        .records
        .iter()
        .map(|value| {
            sdk::ResourceRecord::builder()
                .value(value)
                .build()
                .map_err(|e| build_error("resource record", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let alias = rs
        .alias
        .as_ref()
        .map(|a| {
            sdk::AliasTarget::builder()
                .hosted_zone_id(&a.hosted_zone_id)
                .dns_name(&a.dns_name)
                .evaluate_target_health(a.evaluate_target_health)
                .build()
                .map_err(|e| build_error("alias target", e))
        })
        .transpose()?;

    let geo_location = rs.geolocation.as_ref().map(|g| {
        sdk::GeoLocation::builder()
            .set_continent_code(g.continent_code.clone())
            .set_country_code(g.country_code.clone())
            .set_subdivision_code(g.subdivision_code.clone())
            .build()
    });

    let geo_proximity = rs
        .geoproximity
        .as_ref()
        .map(|g| -> Result<sdk::GeoProximityLocation> {
            let coordinates = g
                .coordinates
                .as_ref()
                .map(|c| {
                    sdk::Coordinates::builder()
                        .latitude(&c.latitude)
                        .longitude(&c.longitude)
                        .build()
                        .map_err(|e| build_error("coordinates", e))
                })
                .transpose()?;
            Ok(sdk::GeoProximityLocation::builder()
                .set_aws_region(g.aws_region.clone())
                .set_local_zone_group(g.local_zone_group.clone())
                .set_coordinates(coordinates)
                .set_bias(g.bias)
                .build())
        })
        .transpose()?;

    let cidr_routing = rs
        .cidr_routing
        .as_ref()
        .map(|c| {
            sdk::CidrRoutingConfig::builder()
                .collection_id(&c.collection_id)
                .location_name(&c.location_name)
                .build()
                .map_err(|e| build_error("CIDR routing config", e))
        })
        .transpose()?;

    sdk::ResourceRecordSet::builder()
        .name(&rs.name)
        .r#type(sdk::RrType::from(rs.record_type.as_str()))
        .set_set_identifier(rs.set_identifier.clone())
        .set_ttl(rs.ttl)
        .set_resource_records((!records.is_empty()).then_some(records))
        .set_alias_target(alias)
        .set_weight(rs.weight)
        .set_failover(rs.failover.map(|f| sdk::ResourceRecordSetFailover::from(f.as_str())))
        .set_geo_location(geo_location)
        .set_geo_proximity_location(geo_proximity)
        .set_region(rs.region.as_deref().map(sdk::ResourceRecordSetRegion::from))
        .set_cidr_routing_config(cidr_routing)
        .set_multi_value_answer(rs.multi_value_answer)
        .set_health_check_id(rs.health_check_id.clone())
        .set_traffic_policy_instance_id(rs.traffic_policy_instance_id.clone())
        .build()
        .map_err(|e| build_error("resource record set", e))
}

pub(crate) fn record_set(rs: &sdk::ResourceRecordSet) -> Result<ResourceRecordSet> {
    let failover = match rs.failover().map(|f| f.as_str()) {
        Some("PRIMARY") => Some(Failover::Primary),
        Some("SECONDARY") => Some(Failover::Secondary),
        _ => None,
    };

    Ok(ResourceRecordSet {
        name: rs.name().to_string(),
        record_type: rs.r#type().as_str().parse()?,
        set_identifier: rs.set_identifier().map(str::to_string),
        ttl: rs.ttl(),
        records: rs
            .resource_records()
            .iter()
            .map(|r| r.value().to_string())
            .collect(),
        alias: rs.alias_target().map(|a| AliasTarget {
            dns_name: a.dns_name().to_string(),
            hosted_zone_id: a.hosted_zone_id().to_string(),
            evaluate_target_health: a.evaluate_target_health(),
        }),
        weight: rs.weight(),
        failover,
        geolocation: rs.geo_location().map(|g| GeoLocation {
            continent_code: g.continent_code().map(str::to_string),
            country_code: g.country_code().map(str::to_string),
            subdivision_code: g.subdivision_code().map(str::to_string),
        }),
        geoproximity: rs.geo_proximity_location().map(|g| GeoProximityLocation {
            aws_region: g.aws_region().map(str::to_string),
            local_zone_group: g.local_zone_group().map(str::to_string),
            coordinates: g.coordinates().map(|c| Coordinates {
                latitude: c.latitude().to_string(),
                longitude: c.longitude().to_string(),
            }),
            bias: g.bias(),
        }),
        region: rs.region().map(|r| r.as_str().to_string()),
        cidr_routing: rs.cidr_routing_config().map(|c| CidrRoutingConfig {
            collection_id: c.collection_id().to_string(),
            location_name: c.location_name().to_string(),
        }),
        multi_value_answer: rs.multi_value_answer(),
        health_check_id: rs.health_check_id().map(str::to_string),
        traffic_policy_instance_id: rs.traffic_policy_instance_id().map(str::to_string),
    })
}

pub(crate) fn change_to_sdk(change: &Change) -> Result<sdk::Change> {
    let action = match change.action {
        ChangeAction::Create => sdk::ChangeAction::Create,
        ChangeAction::Delete => sdk::ChangeAction::Delete,
        ChangeAction::Upsert => sdk::ChangeAction::Upsert,
    };
    sdk::Change::builder()
        .action(action)
        .resource_record_set(record_set_to_sdk(&change.record_set)?)
        .build()
        .map_err(|e| build_error("change", e))
}

// --- health checks ---

pub(crate) fn health_check_config_to_sdk(config: &HealthCheckConfig) -> Result<sdk::HealthCheckConfig> {
    let alarm = config
        .cloudwatch_alarm
        .as_ref()
        .map(|a| {
            sdk::AlarmIdentifier::builder()
                .name(&a.name)
                .region(sdk::CloudWatchRegion::from(a.region.as_str()))
                .build()
                .map_err(|e| build_error("alarm identifier", e))
        })
        .transpose()?;

    sdk::HealthCheckConfig::builder()
        .r#type(sdk::HealthCheckType::from(config.check_type.as_str()))
        .set_fully_qualified_domain_name(config.fqdn.clone())
        .set_ip_address(config.ip_address.clone())
        .set_port(config.port)
        .set_resource_path(config.resource_path.clone())
        .set_search_string(config.search_string.clone())
        .set_request_interval(config.request_interval)
        .set_failure_threshold(config.failure_threshold)
        .measure_latency(config.measure_latency)
        .inverted(config.inverted)
        .disabled(config.disabled)
        .set_enable_sni(config.enable_sni)
        .set_regions(region_list(&config.regions))
        .set_child_health_checks(
            (!config.child_health_checks.is_empty()).then(|| config.child_health_checks.clone()),
        )
        .set_health_threshold(config.health_threshold)
        .set_alarm_identifier(alarm)
        .set_insufficient_data_health_status(
            config
                .insufficient_data_health_status
                .map(|s| sdk::InsufficientDataHealthStatus::from(s.as_str())),
        )
        .set_routing_control_arn(config.routing_control_arn.clone())
        .build()
        .map_err(|e| build_error("health check config", e))
}

pub(crate) fn region_list(regions: &[String]) -> Option<Vec<sdk::HealthCheckRegion>> {
    (!regions.is_empty()).then(|| {
        regions
            .iter()
            .map(|r| sdk::HealthCheckRegion::from(r.as_str()))
            .collect()
    })
}

pub(crate) fn health_check(check: &sdk::HealthCheck) -> Result<HealthCheck> {
    let config = check
        .health_check_config()
        .ok_or_else(|| missing("GetHealthCheck", "HealthCheckConfig"))?;

    let insufficient = match config.insufficient_data_health_status().map(|s| s.as_str()) {
        Some("Healthy") => Some(InsufficientDataHealthStatus::Healthy),
        Some("Unhealthy") => Some(InsufficientDataHealthStatus::Unhealthy),
        Some("LastKnownStatus") => Some(InsufficientDataHealthStatus::LastKnownStatus),
        _ => None,
    };

    let mut regions: Vec<String> = config.regions().iter().map(|r| r.as_str().to_string()).collect();
    regions.sort();

    Ok(HealthCheck {
        id: naming::clean_health_check_id(check.id()),
        caller_reference: check.caller_reference().to_string(),
        version: check.health_check_version(),
        config: HealthCheckConfig {
            check_type: config.r#type().as_str().parse()?,
            fqdn: config.fully_qualified_domain_name().map(str::to_string),
            ip_address: config.ip_address().map(str::to_string),
            port: config.port(),
            resource_path: config.resource_path().map(str::to_string),
            search_string: config.search_string().map(str::to_string),
            request_interval: config.request_interval(),
            failure_threshold: config.failure_threshold(),
            measure_latency: config.measure_latency().unwrap_or_default(),
            inverted: config.inverted().unwrap_or_default(),
            disabled: config.disabled().unwrap_or_default(),
            enable_sni: config.enable_sni(),
            regions,
            child_health_checks: config.child_health_checks().to_vec(),
            health_threshold: config.health_threshold(),
            cloudwatch_alarm: config.alarm_identifier().map(|a| AlarmIdentifier {
                name: a.name().to_string(),
                region: a.region().as_str().to_string(),
            }),
            insufficient_data_health_status: insufficient,
            routing_control_arn: config.routing_control_arn().map(str::to_string),
        },
    })
}

// --- traffic policies ---

pub(crate) fn traffic_policy(policy: &sdk::TrafficPolicy) -> Result<TrafficPolicy> {
    Ok(TrafficPolicy {
        id: policy.id().to_string(),
        version: policy.version(),
        name: policy.name().to_string(),
        policy_type: policy.r#type().as_str().parse()?,
        document: policy.document().to_string(),
        comment: policy.comment().map(str::to_string),
    })
}

pub(crate) fn traffic_policy_instance(
    instance: &sdk::TrafficPolicyInstance,
) -> Result<TrafficPolicyInstance> {
    let message = instance.message();
    Ok(TrafficPolicyInstance {
        id: instance.id().to_string(),
        hosted_zone_id: naming::clean_zone_id(instance.hosted_zone_id()),
        name: instance.name().to_string(),
        ttl: instance.ttl(),
        state: instance.state().parse()?,
        message: (!message.is_empty()).then(|| message.to_string()),
        traffic_policy_id: instance.traffic_policy_id().to_string(),
        traffic_policy_version: instance.traffic_policy_version(),
        traffic_policy_type: instance.traffic_policy_type().as_str().parse()?,
    })
}

// --- DNSSEC ---

pub(crate) fn key_signing_key(key: &sdk::KeySigningKey) -> Result<KeySigningKey> {
    Ok(KeySigningKey {
        name: key.name().unwrap_or_default().to_string(),
        kms_arn: key.kms_arn().unwrap_or_default().to_string(),
        status: key.status().unwrap_or("INTERNAL_FAILURE").parse()?,
        status_message: key.status_message().map(str::to_string),
        flag: key.flag(),
        key_tag: key.key_tag(),
        signing_algorithm_mnemonic: key.signing_algorithm_mnemonic().unwrap_or_default().to_string(),
        signing_algorithm_type: key.signing_algorithm_type(),
        digest_algorithm_mnemonic: key.digest_algorithm_mnemonic().unwrap_or_default().to_string(),
        digest_algorithm_type: key.digest_algorithm_type(),
        digest_value: key.digest_value().unwrap_or_default().to_string(),
        public_key: key.public_key().unwrap_or_default().to_string(),
        ds_record: key.ds_record().unwrap_or_default().to_string(),
        dnskey_record: key.dnskey_record().unwrap_or_default().to_string(),
    })
}

// --- CIDR collections ---

pub(crate) fn cidr_collection(collection: &sdk::CidrCollection) -> CidrCollection {
    CidrCollection {
        id: collection.id().unwrap_or_default().to_string(),
        arn: collection.arn().unwrap_or_default().to_string(),
        name: collection.name().unwrap_or_default().to_string(),
        version: collection.version().unwrap_or_default(),
    }
}

pub(crate) fn collection_summary(summary: &sdk::CollectionSummary) -> CidrCollection {
    CidrCollection {
        id: summary.id().unwrap_or_default().to_string(),
        arn: summary.arn().unwrap_or_default().to_string(),
        name: summary.name().unwrap_or_default().to_string(),
        version: summary.version().unwrap_or_default(),
    }
}

pub(crate) fn cidr_block(block: &sdk::CidrBlockSummary) -> CidrBlock {
    CidrBlock {
        cidr_block: block.cidr_block().unwrap_or_default().to_string(),
        location_name: block.location_name().unwrap_or_default().to_string(),
    }
}

pub(crate) fn cidr_change_to_sdk(change: &CidrCollectionChange) -> Result<sdk::CidrCollectionChange> {
    sdk::CidrCollectionChange::builder()
        .location_name(&change.location_name)
        .action(sdk::CidrCollectionChangeAction::from(change.action.as_str()))
        .set_cidr_list(Some(change.cidr_list.clone()))
        .build()
        .map_err(|e| build_error("CIDR collection change", e))
}
