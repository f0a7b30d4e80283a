// # Changes
//
// Route 53 applies record, zone and DNSSEC mutations asynchronously. Every
// mutation returns a `ChangeInfo` whose status starts as PENDING and moves to
// INSYNC once all authoritative name servers serve the change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::ResourceRecordSet;
use crate::error::Error;

/// Most changes Route 53 accepts in one `ChangeResourceRecordSets` call
pub const MAX_CHANGES_PER_BATCH: usize = 1000;

/// Propagation status of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeStatus {
    /// Not yet applied to all name servers
    Pending,
    /// Applied to all name servers
    Insync,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeStatus::Pending => "PENDING",
            ChangeStatus::Insync => "INSYNC",
        })
    }
}

impl FromStr for ChangeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ChangeStatus::Pending),
            "INSYNC" => Ok(ChangeStatus::Insync),
            other => Err(Error::invalid_input(format!("unknown change status: {other}"))),
        }
    }
}

/// A change token returned by a mutating call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Change ID, without the `/change/` prefix
    pub id: String,
    /// Current propagation status
    pub status: ChangeStatus,
    /// When the change was submitted
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Comment attached to the change batch
    pub comment: Option<String>,
}

impl ChangeInfo {
    /// Create a change token in the given status, submitted now
    pub fn new(id: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            id: id.into(),
            status,
            submitted_at: Some(chrono::Utc::now()),
            comment: None,
        }
    }

    /// Whether the change has propagated
    pub fn is_insync(&self) -> bool {
        self.status == ChangeStatus::Insync
    }
}

/// Action of a single record-set change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create; fails if the record set already exists
    Create,
    /// Delete; the record set must match exactly
    Delete,
    /// Create or replace
    Upsert,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Delete => "DELETE",
            ChangeAction::Upsert => "UPSERT",
        })
    }
}

/// One entry of a `ChangeResourceRecordSets` batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// What to do
    pub action: ChangeAction,
    /// The record set to act on
    pub record_set: ResourceRecordSet,
}

impl Change {
    /// A CREATE change
    pub fn create(record_set: ResourceRecordSet) -> Self {
        Self { action: ChangeAction::Create, record_set }
    }

    /// A DELETE change
    pub fn delete(record_set: ResourceRecordSet) -> Self {
        Self { action: ChangeAction::Delete, record_set }
    }

    /// An UPSERT change
    pub fn upsert(record_set: ResourceRecordSet) -> Self {
        Self { action: ChangeAction::Upsert, record_set }
    }
}
