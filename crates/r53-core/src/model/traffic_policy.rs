use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::RecordType;
use crate::error::Error;

/// One version of a traffic policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPolicy {
    pub id: String,
    pub version: i32,
    pub name: String,
    /// DNS type of the records the policy creates
    pub policy_type: RecordType,
    /// JSON policy document
    pub document: String,
    pub comment: Option<String>,
}

/// Provisioning state of a traffic policy instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficPolicyInstanceState {
    Applied,
    Creating,
    Updating,
    Deleting,
    Failed,
}

impl fmt::Display for TrafficPolicyInstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrafficPolicyInstanceState::Applied => "Applied",
            TrafficPolicyInstanceState::Creating => "Creating",
            TrafficPolicyInstanceState::Updating => "Updating",
            TrafficPolicyInstanceState::Deleting => "Deleting",
            TrafficPolicyInstanceState::Failed => "Failed",
        })
    }
}

impl FromStr for TrafficPolicyInstanceState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(TrafficPolicyInstanceState::Applied),
            "Creating" => Ok(TrafficPolicyInstanceState::Creating),
            "Updating" => Ok(TrafficPolicyInstanceState::Updating),
            "Deleting" => Ok(TrafficPolicyInstanceState::Deleting),
            "Failed" => Ok(TrafficPolicyInstanceState::Failed),
            other => Err(Error::invalid_input(format!(
                "unknown traffic policy instance state: {other}"
            ))),
        }
    }
}

/// Records created in a hosted zone from a traffic policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPolicyInstance {
    pub id: String,
    pub hosted_zone_id: String,
    /// Record name, without the trailing dot
    pub name: String,
    pub ttl: i64,
    pub state: TrafficPolicyInstanceState,
    /// Failure detail when `state` is `Failed`
    pub message: Option<String>,
    pub traffic_policy_id: String,
    pub traffic_policy_version: i32,
    pub traffic_policy_type: RecordType,
}

/// Input of `CreateTrafficPolicyInstance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTrafficPolicyInstanceRequest {
    pub hosted_zone_id: String,
    pub name: String,
    pub ttl: i64,
    pub traffic_policy_id: String,
    pub traffic_policy_version: i32,
}
