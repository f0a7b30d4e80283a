// # Resource Record Sets
//
// A record set is identified inside a hosted zone by its name, type and
// (for routed records) set identifier. Everything else is content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::naming;

/// DNS record type supported by Route 53
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Ds,
    Https,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Sshfp,
    Svcb,
    Tlsa,
    Txt,
}

impl RecordType {
    /// The wire spelling of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Ds => "DS",
            RecordType::Https => "HTTPS",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Sshfp => "SSHFP",
            RecordType::Svcb => "SVCB",
            RecordType::Tlsa => "TLSA",
            RecordType::Txt => "TXT",
        }
    }

    /// Whether values of this type are character-strings that need quoting
    pub fn is_text(&self) -> bool {
        matches!(self, RecordType::Txt | RecordType::Spf)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CAA" => RecordType::Caa,
            "CNAME" => RecordType::Cname,
            "DS" => RecordType::Ds,
            "HTTPS" => RecordType::Https,
            "MX" => RecordType::Mx,
            "NAPTR" => RecordType::Naptr,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "SOA" => RecordType::Soa,
            "SPF" => RecordType::Spf,
            "SRV" => RecordType::Srv,
            "SSHFP" => RecordType::Sshfp,
            "SVCB" => RecordType::Svcb,
            "TLSA" => RecordType::Tlsa,
            "TXT" => RecordType::Txt,
            other => return Err(Error::invalid_input(format!("unsupported record type: {other}"))),
        };
        Ok(t)
    }
}

/// Alias target of an alias record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    /// DNS name of the target (ELB, CloudFront, S3 website, another record...)
    pub dns_name: String,
    /// Hosted zone ID of the target
    pub hosted_zone_id: String,
    /// Whether Route 53 checks the health of the target
    #[serde(default)]
    pub evaluate_target_health: bool,
}

/// Failover role of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Failover {
    Primary,
    Secondary,
}

impl Failover {
    /// The wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Failover::Primary => "PRIMARY",
            Failover::Secondary => "SECONDARY",
        }
    }
}

/// Geolocation routing selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision_code: Option<String>,
}

/// Latitude/longitude pair, kept as the decimal strings the API uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Geoproximity routing selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoProximityLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_zone_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<i32>,
}

/// CIDR routing selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrRoutingConfig {
    pub collection_id: String,
    /// Location name, or `*` for the default location
    pub location_name: String,
}

/// A resource record set as Route 53 stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecordSet {
    /// Fully qualified name, without the trailing dot
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// Record values in wire format
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<AliasTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover: Option<Failover>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoproximity: Option<GeoProximityLocation>,
    /// Latency routing region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_routing: Option<CidrRoutingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_answer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_id: Option<String>,
    /// Set when the record was created by a traffic policy instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_policy_instance_id: Option<String>,
}

impl ResourceRecordSet {
    /// A simple (non-routed, non-alias) record set
    pub fn simple(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: i64,
        records: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            set_identifier: None,
            ttl: Some(ttl),
            records,
            alias: None,
            weight: None,
            failover: None,
            geolocation: None,
            geoproximity: None,
            region: None,
            cidr_routing: None,
            multi_value_answer: None,
            health_check_id: None,
            traffic_policy_instance_id: None,
        }
    }

    /// The identity of this record set inside its zone
    pub fn key(&self) -> RecordSetKey {
        RecordSetKey::new(&self.name, self.record_type, self.set_identifier.as_deref())
    }

    /// Whether this is the zone's own SOA or NS record set
    pub fn is_apex_authority(&self, zone_name: &str) -> bool {
        matches!(self.record_type, RecordType::Soa | RecordType::Ns)
            && self.key().name == naming::normalize_name(zone_name)
    }

    /// Canonical form used for content comparison
    ///
    /// Names and alias targets are normalized, values are sorted (Route 53
    /// treats them as a set) and `multi_value_answer: Some(false)` is folded
    /// into `None`.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.name = naming::normalize_name(&self.name);
        out.records.sort();
        if let Some(alias) = out.alias.as_mut() {
            alias.dns_name = naming::normalize_alias_name(&alias.dns_name);
            alias.hosted_zone_id = naming::clean_zone_id(&alias.hosted_zone_id);
        }
        if out.multi_value_answer == Some(false) {
            out.multi_value_answer = None;
        }
        out
    }

    /// Whether two record sets carry the same content
    pub fn same_contents(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

/// Identity of a record set inside a hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordSetKey {
    /// Lowercase name, escapes decoded, no trailing dot
    pub name: String,
    pub record_type: RecordType,
    /// Empty for record sets without a set identifier
    pub set_identifier: String,
}

impl RecordSetKey {
    pub fn new(name: &str, record_type: RecordType, set_identifier: Option<&str>) -> Self {
        Self {
            name: naming::normalize_name(name),
            record_type,
            set_identifier: set_identifier.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for RecordSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set_identifier.is_empty() {
            write!(f, "{} {}", self.name, self.record_type)
        } else {
            write!(f, "{} {} ({})", self.name, self.record_type, self.set_identifier)
        }
    }
}
