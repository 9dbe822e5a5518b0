// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Per-Connection Evaluation State
//!
//! [`EvaluationStore`] is the side table holding everything a connection has
//! learned about the requirement trees evaluated against it: memoized
//! results and quantifier scan progress, keyed by
//! [`RequirementId`].
//!
//! Every entry is stamped with the connection epoch it was computed in.
//! Advancing the epoch (on disconnect) discards all entries, and writes
//! stamped with an older epoch are dropped, so a result computed across a
//! disconnect is never reused.
//!
//! A quantifier scan moves only forward:
//!
//! ```text
//! NotEnumerated -> PartiallyScanned(n) -> FullyScanned
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::requirement::RequirementId;

/// What is known about one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Probe {
    #[default]
    Unknown,
    Allowed,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    NotEnumerated,
    PartiallyScanned(usize),
    FullyScanned,
}

/// Instance names of one node type and the probe result for each, scanned in
/// enumeration order up to `cursor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeScan {
    names: Vec<String>,
    checked: Vec<Probe>,
    cursor: usize,
}

impl NodeScan {
    pub fn new(names: Vec<String>) -> Self {
        let checked = vec![Probe::Unknown; names.len()];
        Self {
            names,
            checked,
            cursor: 0,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.names.len()
    }

    pub fn phase(&self) -> ScanPhase {
        if self.is_complete() {
            ScanPhase::FullyScanned
        } else {
            ScanPhase::PartiallyScanned(self.cursor)
        }
    }

    /// The next unscanned instance.
    pub fn next_unchecked(&self) -> Option<&str> {
        self.names.get(self.cursor).map(String::as_str)
    }

    /// Record the probe for the instance at the cursor and move past it.
    pub fn record(&mut self, allowed: bool) {
        if let Some(slot) = self.checked.get_mut(self.cursor) {
            *slot = if allowed { Probe::Allowed } else { Probe::Denied };
            self.cursor += 1;
        }
    }

    pub fn any_allowed(&self) -> bool {
        self.checked.contains(&Probe::Allowed)
    }

    /// Names probed as allowed so far, in enumeration order.
    pub fn allowed(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(&self.checked)
            .filter(|(_, probe)| **probe == Probe::Allowed)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub fn phase_of(scan: Option<&NodeScan>) -> ScanPhase {
    scan.map_or(ScanPhase::NotEnumerated, NodeScan::phase)
}

#[derive(Debug, Clone, Default)]
pub struct PerNodeState {
    pub scan: Option<NodeScan>,
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct HostServerState {
    /// Host names, once enumerated.
    pub hosts: Option<Vec<String>>,
    /// Server scan per host, parallel to `hosts`.
    pub servers: Vec<Option<NodeScan>>,
    /// Index of the host the satisfaction scan is working on.
    pub cursor: usize,
    /// Hosts never scanned because satisfaction was found earlier; scanned
    /// only if the allowed hosts are requested.
    pub deferred: BTreeSet<usize>,
    pub allowed_hosts: Option<Vec<String>>,
}

impl HostServerState {
    pub fn any_allowed(&self) -> bool {
        self.servers.iter().flatten().any(NodeScan::any_allowed)
    }

    pub fn host_index(&self, host: &str) -> Option<usize> {
        self.hosts.as_ref()?.iter().position(|h| h == host)
    }
}

#[derive(Debug, Clone)]
pub enum ScanState {
    PerNode(PerNodeState),
    HostServer(HostServerState),
}

#[derive(Debug, Default)]
struct Entry {
    epoch: u64,
    satisfied: Option<bool>,
    scan: Option<ScanState>,
}

#[derive(Debug, Default)]
pub struct EvaluationStore {
    epoch: AtomicU64,
    entries: Mutex<HashMap<RequirementId, Entry>>,
}

impl EvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn memoized(&self, id: RequirementId) -> Option<bool> {
        let epoch = self.epoch();
        let entries = self.entries.lock();
        entries
            .get(&id)
            .filter(|entry| entry.epoch == epoch)
            .and_then(|entry| entry.satisfied)
    }

    /// Store a result computed during `epoch`; dropped if the epoch has since
    /// advanced.
    pub fn memoize(&self, id: RequirementId, epoch: u64, satisfied: bool) {
        self.update(id, epoch, |entry| entry.satisfied = Some(satisfied));
    }

    /// Take the scan state of `id` out of the store for the duration of a
    /// scan step.
    pub fn take_scan(&self, id: RequirementId) -> Option<ScanState> {
        let epoch = self.epoch();
        let mut entries = self.entries.lock();
        entries
            .get_mut(&id)
            .filter(|entry| entry.epoch == epoch)
            .and_then(|entry| entry.scan.take())
    }

    pub fn put_scan(&self, id: RequirementId, epoch: u64, state: ScanState) {
        self.update(id, epoch, |entry| entry.scan = Some(state));
    }

    /// Forget everything about `id`.
    pub fn reset(&self, id: RequirementId) {
        self.entries.lock().remove(&id);
    }

    /// Start a new epoch, discarding all state.
    pub fn advance_epoch(&self) -> u64 {
        let mut entries = self.entries.lock();
        entries.clear();
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: RequirementId, epoch: u64, apply: impl FnOnce(&mut Entry)) {
        let mut entries = self.entries.lock();
        if epoch != self.epoch() {
            return;
        }
        let entry = entries.entry(id).or_default();
        if entry.epoch != epoch {
            *entry = Entry {
                epoch,
                ..Entry::default()
            };
        }
        apply(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_scan_resumes_from_cursor() {
        let mut scan = NodeScan::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(scan.phase(), ScanPhase::PartiallyScanned(0));
        scan.record(false);
        scan.record(true);
        assert_eq!(scan.next_unchecked(), Some("c"));
        assert_eq!(scan.phase(), ScanPhase::PartiallyScanned(2));
        scan.record(false);
        assert_eq!(scan.phase(), ScanPhase::FullyScanned);
        assert_eq!(scan.allowed(), vec!["b".to_string()]);
        assert_eq!(phase_of(None), ScanPhase::NotEnumerated);
    }

    #[test]
    fn test_memo_is_discarded_when_epoch_advances() {
        let store = EvaluationStore::new();
        let id = RequirementId::new();
        let epoch = store.epoch();
        store.memoize(id, epoch, true);
        assert_eq!(store.memoized(id), Some(true));

        store.advance_epoch();
        assert_eq!(store.memoized(id), None);

        store.memoize(id, epoch, false);
        assert_eq!(store.memoized(id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_scan_state_is_taken_and_returned() {
        let store = EvaluationStore::new();
        let id = RequirementId::new();
        let epoch = store.epoch();
        store.put_scan(id, epoch, ScanState::PerNode(PerNodeState::default()));
        assert!(store.take_scan(id).is_some());
        assert!(store.take_scan(id).is_none());

        store.memoize(id, epoch, true);
        store.reset(id);
        assert_eq!(store.memoized(id), None);
    }
}
