use serde::{Deserialize, Serialize};

use super::change::ChangeInfo;

/// A VPC attached to a private hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vpc {
    pub vpc_id: String,
    /// Region of the VPC; defaults to the provider region when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_region: Option<String>,
}

/// Hosted zone summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    /// Zone ID without the `/hostedzone/` prefix
    pub id: String,
    /// Zone name without the trailing dot
    pub name: String,
    pub caller_reference: String,
    pub comment: Option<String>,
    pub private_zone: bool,
    pub resource_record_set_count: i64,
}

/// Everything `GetHostedZone` returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneDetails {
    pub zone: HostedZone,
    /// Authoritative name servers; empty for private zones
    pub name_servers: Vec<String>,
    /// Reusable delegation set ID, if the zone uses one
    pub delegation_set_id: Option<String>,
    /// Associated VPCs; empty for public zones
    pub vpcs: Vec<Vpc>,
}

/// Input of `CreateHostedZone`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHostedZoneRequest {
    pub name: String,
    /// Idempotency token, unique per create attempt
    pub caller_reference: String,
    pub comment: Option<String>,
    /// Setting a VPC makes the zone private
    pub vpc: Option<Vpc>,
    pub delegation_set_id: Option<String>,
}

/// Output of `CreateHostedZone`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHostedZoneResponse {
    pub zone: HostedZone,
    pub change: ChangeInfo,
    pub name_servers: Vec<String>,
}
