// # DNSSEC
//
// Signing is toggled per hosted zone; key-signing keys (KSKs) wrap a KMS key
// and move through their own status lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Zone-level DNSSEC signing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServeSignature {
    Signing,
    NotSigning,
    Deleting,
    ActionNeeded,
    InternalFailure,
}

impl ServeSignature {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServeSignature::Signing => "SIGNING",
            ServeSignature::NotSigning => "NOT_SIGNING",
            ServeSignature::Deleting => "DELETING",
            ServeSignature::ActionNeeded => "ACTION_NEEDED",
            ServeSignature::InternalFailure => "INTERNAL_FAILURE",
        }
    }
}

impl fmt::Display for ServeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIGNING" => Ok(ServeSignature::Signing),
            "NOT_SIGNING" => Ok(ServeSignature::NotSigning),
            "DELETING" => Ok(ServeSignature::Deleting),
            "ACTION_NEEDED" => Ok(ServeSignature::ActionNeeded),
            "INTERNAL_FAILURE" => Ok(ServeSignature::InternalFailure),
            other => Err(Error::invalid_input(format!("unknown DNSSEC signing status: {other}"))),
        }
    }
}

/// Key-signing key status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeySigningKeyStatus {
    Active,
    Inactive,
    Deleting,
    ActionNeeded,
    InternalFailure,
}

impl KeySigningKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySigningKeyStatus::Active => "ACTIVE",
            KeySigningKeyStatus::Inactive => "INACTIVE",
            KeySigningKeyStatus::Deleting => "DELETING",
            KeySigningKeyStatus::ActionNeeded => "ACTION_NEEDED",
            KeySigningKeyStatus::InternalFailure => "INTERNAL_FAILURE",
        }
    }
}

impl fmt::Display for KeySigningKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeySigningKeyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(KeySigningKeyStatus::Active),
            "INACTIVE" => Ok(KeySigningKeyStatus::Inactive),
            "DELETING" => Ok(KeySigningKeyStatus::Deleting),
            "ACTION_NEEDED" => Ok(KeySigningKeyStatus::ActionNeeded),
            "INTERNAL_FAILURE" => Ok(KeySigningKeyStatus::InternalFailure),
            other => Err(Error::invalid_input(format!("unknown key signing key status: {other}"))),
        }
    }
}

/// A key-signing key and the DNS material derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySigningKey {
    pub name: String,
    pub kms_arn: String,
    pub status: KeySigningKeyStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    pub flag: i32,
    pub key_tag: i32,
    pub signing_algorithm_mnemonic: String,
    pub signing_algorithm_type: i32,
    pub digest_algorithm_mnemonic: String,
    pub digest_algorithm_type: i32,
    pub digest_value: String,
    pub public_key: String,
    pub ds_record: String,
    pub dnskey_record: String,
}

/// Output of `GetDNSSEC`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnssecInfo {
    pub serve_signature: ServeSignature,
    pub status_message: Option<String>,
    pub key_signing_keys: Vec<KeySigningKey>,
}

impl DnssecInfo {
    /// Look up a key-signing key by name
    pub fn key(&self, name: &str) -> Option<&KeySigningKey> {
        self.key_signing_keys.iter().find(|k| k.name == name)
    }
}

/// Input of `CreateKeySigningKey`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateKeySigningKeyRequest {
    pub hosted_zone_id: String,
    pub name: String,
    pub kms_arn: String,
    /// Initial status, `Active` or `Inactive`
    pub status: KeySigningKeyStatus,
    pub caller_reference: String,
}
