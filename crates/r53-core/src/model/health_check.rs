use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthCheckType {
    Http,
    Https,
    HttpStrMatch,
    HttpsStrMatch,
    Tcp,
    Calculated,
    CloudwatchMetric,
    RecoveryControl,
}

impl HealthCheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCheckType::Http => "HTTP",
            HealthCheckType::Https => "HTTPS",
            HealthCheckType::HttpStrMatch => "HTTP_STR_MATCH",
            HealthCheckType::HttpsStrMatch => "HTTPS_STR_MATCH",
            HealthCheckType::Tcp => "TCP",
            HealthCheckType::Calculated => "CALCULATED",
            HealthCheckType::CloudwatchMetric => "CLOUDWATCH_METRIC",
            HealthCheckType::RecoveryControl => "RECOVERY_CONTROL",
        }
    }

    /// Whether the check probes an endpoint over the network
    pub fn is_endpoint_check(&self) -> bool {
        matches!(
            self,
            HealthCheckType::Http
                | HealthCheckType::Https
                | HealthCheckType::HttpStrMatch
                | HealthCheckType::HttpsStrMatch
                | HealthCheckType::Tcp
        )
    }

    /// Whether the check matches a string in the response body
    pub fn is_string_match(&self) -> bool {
        matches!(self, HealthCheckType::HttpStrMatch | HealthCheckType::HttpsStrMatch)
    }
}

impl fmt::Display for HealthCheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthCheckType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s {
            "HTTP" => HealthCheckType::Http,
            "HTTPS" => HealthCheckType::Https,
            "HTTP_STR_MATCH" => HealthCheckType::HttpStrMatch,
            "HTTPS_STR_MATCH" => HealthCheckType::HttpsStrMatch,
            "TCP" => HealthCheckType::Tcp,
            "CALCULATED" => HealthCheckType::Calculated,
            "CLOUDWATCH_METRIC" => HealthCheckType::CloudwatchMetric,
            "RECOVERY_CONTROL" => HealthCheckType::RecoveryControl,
            other => return Err(Error::invalid_input(format!("unknown health check type: {other}"))),
        };
        Ok(t)
    }
}

/// Status reported when a CloudWatch alarm has insufficient data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsufficientDataHealthStatus {
    Healthy,
    Unhealthy,
    LastKnownStatus,
}

impl InsufficientDataHealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsufficientDataHealthStatus::Healthy => "Healthy",
            InsufficientDataHealthStatus::Unhealthy => "Unhealthy",
            InsufficientDataHealthStatus::LastKnownStatus => "LastKnownStatus",
        }
    }
}

/// CloudWatch alarm backing a `CLOUDWATCH_METRIC` check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmIdentifier {
    pub name: String,
    pub region: String,
}

/// Health check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    #[serde(rename = "type")]
    pub check_type: HealthCheckType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_string: Option<String>,
    /// Seconds between checks, 10 or 30
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_interval: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
    #[serde(default)]
    pub measure_latency: bool,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sni: Option<bool>,
    /// Checker regions; empty means Route 53's default set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_health_checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_threshold: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudwatch_alarm: Option<AlarmIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient_data_health_status: Option<InsufficientDataHealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_control_arn: Option<String>,
}

impl HealthCheckConfig {
    /// A config of the given type with every optional setting unset
    pub fn new(check_type: HealthCheckType) -> Self {
        Self {
            check_type,
            fqdn: None,
            ip_address: None,
            port: None,
            resource_path: None,
            search_string: None,
            request_interval: None,
            failure_threshold: None,
            measure_latency: false,
            inverted: false,
            disabled: false,
            enable_sni: None,
            regions: Vec::new(),
            child_health_checks: Vec::new(),
            health_threshold: None,
            cloudwatch_alarm: None,
            insufficient_data_health_status: None,
            routing_control_arn: None,
        }
    }
}

/// A health check as Route 53 returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub id: String,
    pub caller_reference: String,
    /// Optimistic-locking version, bumped on every update
    pub version: i64,
    pub config: HealthCheckConfig,
}
