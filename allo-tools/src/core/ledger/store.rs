// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Storage backends for ledger files.

use std::{collections::HashMap, sync::Mutex};

use alloy::primitives::{keccak256, B256};

use super::{LedgerEntries, LedgerError};

/// Optimistic concurrency token for one ledger.
///
/// A writer must present the revision it read; the backend refuses the write if the stored
/// ledger has changed since.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Revision {
    /// Nothing stored yet.
    #[default]
    Absent,
    /// Hash of the stored bytes.
    Hash(B256),
}

impl Revision {
    pub fn of(bytes: &[u8]) -> Self {
        Self::Hash(keccak256(bytes))
    }
}

/// A ledger as read from a backend.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub entries: LedgerEntries,
    pub revision: Revision,
}

/// Key-value storage for ledgers, one ledger per logical name.
pub trait LedgerStore {
    /// Reads the named ledger.
    ///
    /// Ledgers that do not exist, or cannot be parsed, load as empty.
    fn load(&self, name: &str) -> Result<Snapshot, LedgerError>;

    /// Replaces the named ledger, provided it is still at `expected`.
    ///
    /// Returns the new revision.
    fn store(
        &self,
        name: &str,
        entries: &LedgerEntries,
        expected: Revision,
    ) -> Result<Revision, LedgerError>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load(&self, name: &str) -> Result<Snapshot, LedgerError> {
        (**self).load(name)
    }

    fn store(
        &self,
        name: &str,
        entries: &LedgerEntries,
        expected: Revision,
    ) -> Result<Revision, LedgerError> {
        (**self).store(name, entries, expected)
    }
}

/// Serializes ledger entries the way ledger files are laid out on disk.
pub fn to_pretty_json(entries: &LedgerEntries) -> Result<String, LedgerError> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    Ok(json)
}

/// In-memory ledgers, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw ledger text, bypassing revision checks.
    pub fn seed(&self, name: &str, json: impl Into<String>) {
        self.ledgers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), json.into());
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Snapshot, LedgerError> {
        let ledgers = self.ledgers.lock().unwrap_or_else(|e| e.into_inner());
        let Some(json) = ledgers.get(name) else {
            return Ok(Snapshot::default());
        };
        Ok(Snapshot {
            entries: parse_or_empty(name, json),
            revision: Revision::of(json.as_bytes()),
        })
    }

    fn store(
        &self,
        name: &str,
        entries: &LedgerEntries,
        expected: Revision,
    ) -> Result<Revision, LedgerError> {
        let mut ledgers = self.ledgers.lock().unwrap_or_else(|e| e.into_inner());
        let current = ledgers
            .get(name)
            .map(|json| Revision::of(json.as_bytes()))
            .unwrap_or_default();
        if current != expected {
            return Err(LedgerError::Conflict {
                name: name.to_string(),
            });
        }
        let json = to_pretty_json(entries)?;
        let revision = Revision::of(json.as_bytes());
        ledgers.insert(name.to_string(), json);
        Ok(revision)
    }
}

/// Parses ledger text, degrading to an empty ledger on malformed input.
pub(super) fn parse_or_empty(name: &str, json: &str) -> LedgerEntries {
    match serde_json::from_str(json) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(@yellow, "ledger {name} is unreadable ({err}), treating it as empty");
            LedgerEntries::new()
        }
    }
}
