//! Record-set reconciliation
//!
//! Computes the changes that turn the record sets observed in a hosted zone
//! into a declared set. Record sets are matched by [`RecordSetKey`], so
//! `WWW.example.com.` and `www.example.com` are the same record set.

use std::collections::BTreeMap;

use crate::model::{Change, RecordSetKey, ResourceRecordSet};

/// Differences between observed and declared record sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSetDiff {
    /// Declared but not present
    pub add: Vec<ResourceRecordSet>,
    /// Present but not declared
    pub remove: Vec<ResourceRecordSet>,
    /// Present and declared with different contents; holds the declared side
    pub modify: Vec<ResourceRecordSet>,
}

impl RecordSetDiff {
    /// Whether nothing needs to change
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.modify.is_empty()
    }

    /// Number of changes the diff turns into
    pub fn len(&self) -> usize {
        self.add.len() + self.remove.len() + self.modify.len()
    }

    /// Turn the diff into a change batch: deletes, then creates, then upserts
    ///
    /// Deletes go first so that a CNAME can replace other types at the same
    /// name within one batch.
    pub fn into_changes(self) -> Vec<Change> {
        let mut changes = Vec::with_capacity(self.len());
        changes.extend(self.remove.into_iter().map(Change::delete));
        changes.extend(self.add.into_iter().map(Change::create));
        changes.extend(self.modify.into_iter().map(Change::upsert));
        changes
    }
}

/// Diff the record sets of a zone against a declared set
///
/// The zone's own SOA and NS record sets are owned by Route 53 and never
/// land in `remove`. When `desired` declares the same key twice the last
/// declaration wins.
pub fn diff_record_sets(
    zone_name: &str,
    observed: &[ResourceRecordSet],
    desired: &[ResourceRecordSet],
) -> RecordSetDiff {
    let observed_by_key: BTreeMap<RecordSetKey, &ResourceRecordSet> =
        observed.iter().map(|rs| (rs.key(), rs)).collect();
    let desired_by_key: BTreeMap<RecordSetKey, &ResourceRecordSet> =
        desired.iter().map(|rs| (rs.key(), rs)).collect();

    let mut diff = RecordSetDiff::default();

    for (key, want) in &desired_by_key {
        match observed_by_key.get(key) {
            None => diff.add.push((*want).clone()),
            Some(have) if !have.same_contents(want) => diff.modify.push((*want).clone()),
            Some(_) => {}
        }
    }

    for (key, have) in &observed_by_key {
        if !desired_by_key.contains_key(key) && !have.is_apex_authority(zone_name) {
            diff.remove.push((*have).clone());
        }
    }

    diff
}
