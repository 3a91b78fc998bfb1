// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Deployment ledger.
//!
//! A ledger is a JSON document mapping chain ids to [`DeploymentRecord`]s, one ledger per logical
//! contract group (`registry`, `allo`, `contractFactory`, one per strategy). Writes replace a
//! single chain's record and leave every other chain's record as it was.

use alloy::primitives::Address;

pub use file::FileStore;
pub use record::{DeploymentRecord, LedgerEntries};
pub use store::{LedgerStore, MemoryStore, Revision, Snapshot};

use crate::utils::parse_address;

mod file;
mod record;
mod store;

/// Ledger holding the Registry proxy.
pub const REGISTRY: &str = "registry";
/// Ledger holding the Allo proxy.
pub const ALLO: &str = "allo";
/// Ledger holding the ContractFactory.
pub const CONTRACT_FACTORY: &str = "contractFactory";

/// Name of the ledger recording a strategy.
pub fn strategy_ledger(strategy_name: &str) -> String {
    strategy_name.to_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ledger {name} was modified by another writer, re-read it and try again")]
    Conflict { name: String },
    #[error("no {field} address recorded in ledger {ledger} for chain {chain_id}")]
    MissingDependency {
        ledger: String,
        field: &'static str,
        chain_id: u64,
    },
}

/// One ledger, loaded into memory.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    name: String,
    snapshot: Snapshot,
}

impl<S: LedgerStore> Ledger<S> {
    /// Loads the named ledger. Missing or unreadable ledgers load as empty.
    pub fn read(store: S, name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let snapshot = store.load(&name)?;
        Ok(Self {
            store,
            name,
            snapshot,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &LedgerEntries {
        &self.snapshot.entries
    }

    pub fn revision(&self) -> Revision {
        self.snapshot.revision
    }

    pub fn get(&self, chain_id: u64) -> Option<&DeploymentRecord> {
        self.snapshot.entries.get(&chain_id)
    }

    /// Sets the record for `chain_id` and persists the whole ledger.
    pub fn write(&mut self, chain_id: u64, record: DeploymentRecord) -> Result<(), LedgerError> {
        let mut entries = self.snapshot.entries.clone();
        entries.insert(chain_id, record);
        self.commit(entries)
    }

    /// Edits the record for `chain_id` in place, creating an empty one if needed.
    pub fn update(
        &mut self,
        chain_id: u64,
        edit: impl FnOnce(&mut DeploymentRecord),
    ) -> Result<(), LedgerError> {
        let mut entries = self.snapshot.entries.clone();
        edit(entries.entry(chain_id).or_default());
        self.commit(entries)
    }

    fn commit(&mut self, entries: LedgerEntries) -> Result<(), LedgerError> {
        let revision = self
            .store
            .store(&self.name, &entries, self.snapshot.revision)?;
        self.snapshot = Snapshot { entries, revision };
        Ok(())
    }
}

/// Ledger access for one chain, including lookups across ledgers.
#[derive(Debug)]
pub struct Deployments<S> {
    store: S,
    chain_id: u64,
}

impl<S: LedgerStore> Deployments<S> {
    pub fn new(store: S, chain_id: u64) -> Self {
        Self { store, chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self, name: &str) -> Result<Ledger<&S>, LedgerError> {
        Ledger::read(&self.store, name)
    }

    /// This chain's record in the named ledger.
    pub fn get(&self, name: &str) -> Result<Option<DeploymentRecord>, LedgerError> {
        Ok(self.ledger(name)?.get(self.chain_id).cloned())
    }

    /// Writes this chain's record in the named ledger.
    pub fn put(&self, name: &str, record: DeploymentRecord) -> Result<(), LedgerError> {
        self.ledger(name)?.write(self.chain_id, record)
    }

    /// Edits this chain's record in the named ledger.
    pub fn update(
        &self,
        name: &str,
        edit: impl FnOnce(&mut DeploymentRecord),
    ) -> Result<(), LedgerError> {
        self.ledger(name)?.update(self.chain_id, edit)
    }

    /// Looks up a field of this chain's record in another ledger.
    ///
    /// Returns the empty string when the ledger, record or field is missing.
    pub fn lookup(&self, ledger: &str, field: &str) -> String {
        match self.get(ledger) {
            Ok(Some(record)) => record.field(field).to_string(),
            _ => String::new(),
        }
    }

    /// Registry proxy address, or the empty string.
    pub fn registry(&self) -> String {
        self.lookup(REGISTRY, "proxy")
    }

    /// Allo proxy address, or the empty string.
    pub fn allo(&self) -> String {
        self.lookup(ALLO, "proxy")
    }

    /// ContractFactory address, or the empty string.
    pub fn contract_factory(&self) -> String {
        self.lookup(CONTRACT_FACTORY, "address")
    }

    /// Like [`Self::lookup`], but fails unless the field holds an address.
    pub fn require(&self, ledger: &str, field: &'static str) -> Result<Address, LedgerError> {
        parse_address(&self.lookup(ledger, field)).ok_or_else(|| LedgerError::MissingDependency {
            ledger: ledger.to_string(),
            field,
            chain_id: self.chain_id,
        })
    }

    pub fn require_registry(&self) -> Result<Address, LedgerError> {
        self.require(REGISTRY, "proxy")
    }

    pub fn require_allo(&self) -> Result<Address, LedgerError> {
        self.require(ALLO, "proxy")
    }

    pub fn require_contract_factory(&self) -> Result<Address, LedgerError> {
        self.require(CONTRACT_FACTORY, "address")
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const SEED: &str = r#"{
      "1": { "name": "Allo", "version": "v1.0", "proxy": "0x1133eA7Af70876e64665ecD07C0A0476d09465a1" },
      "5": { "name": "Allo", "version": "v1.0b", "proxy": "0x79536CC062EE8FAFA7A19a5fa07783BD7F792206", "treasury": "0x0000000000000000000000000000000000000005" }
    }"#;

    #[test]
    fn write_leaves_other_chains_untouched() {
        let store = MemoryStore::new();
        store.seed(ALLO, SEED);
        let before = Ledger::read(&store, ALLO).unwrap();
        let chain_1 = before.get(1).cloned().unwrap();
        let chain_5 = before.get(5).cloned().unwrap();

        let mut ledger = Ledger::read(&store, ALLO).unwrap();
        ledger
            .write(10, DeploymentRecord::new("Allo", "v1.1"))
            .unwrap();

        let after = Ledger::read(&store, ALLO).unwrap();
        assert_eq!(after.entries().len(), 3);
        assert_eq!(after.get(1), Some(&chain_1));
        assert_eq!(after.get(5), Some(&chain_5));
    }

    #[test]
    fn write_then_get_returns_record() {
        let store = MemoryStore::new();
        let record = DeploymentRecord::new("Registry", "v1.0")
            .with_proxy(
                address!("4AAcca72145e1dF2aeC137E1f3C5E3D75DB8b5f3"),
                address!("9Ab7dC5D8f0a6F7F0b4a6e0E3A7A67d2D8f0e3f1"),
            )
            .with_deployer(address!("0000000000000000000000000000000000000abc"))
            .with_field("owner", "0x0000000000000000000000000000000000000def");

        let mut ledger = Ledger::read(&store, REGISTRY).unwrap();
        ledger.write(11155111, record.clone()).unwrap();
        assert_eq!(ledger.get(11155111), Some(&record));

        let reread = Ledger::read(&store, REGISTRY).unwrap();
        assert_eq!(reread.get(11155111), Some(&record));
    }

    #[test]
    fn missing_ledger_reads_empty() {
        let store = MemoryStore::new();
        let ledger = Ledger::read(&store, "doesnotexist").unwrap();
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.get(1), None);
    }

    #[test]
    fn update_edits_in_place() {
        let store = MemoryStore::new();
        store.seed(ALLO, SEED);
        let deployments = Deployments::new(&store, 5);
        deployments
            .update(ALLO, |record| {
                record.implementation =
                    Some("0x0000000000000000000000000000000000000007".to_string())
            })
            .unwrap();

        let record = deployments.get(ALLO).unwrap().unwrap();
        assert_eq!(record.version.as_deref(), Some("v1.0b"));
        assert_eq!(record.field("treasury"), "0x0000000000000000000000000000000000000005");
        assert_eq!(
            record.field("implementation"),
            "0x0000000000000000000000000000000000000007"
        );
    }

    #[test]
    fn lookups_default_to_empty() {
        let store = MemoryStore::new();
        store.seed(ALLO, SEED);
        assert_eq!(Deployments::new(&store, 42).allo(), "");
        assert_eq!(Deployments::new(&store, 1).registry(), "");
        assert_eq!(Deployments::new(&store, 1).contract_factory(), "");
        assert_eq!(
            Deployments::new(&store, 1).allo(),
            "0x1133eA7Af70876e64665ecD07C0A0476d09465a1"
        );
    }

    #[test]
    fn strict_lookups_fail_fast() {
        let store = MemoryStore::new();
        store.seed(ALLO, SEED);
        let err = Deployments::new(&store, 42).require_allo().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MissingDependency { chain_id: 42, field: "proxy", .. }
        ));
        assert_eq!(
            Deployments::new(&store, 5).require_allo().unwrap(),
            address!("79536CC062EE8FAFA7A19a5fa07783BD7F792206")
        );
    }

    #[test]
    fn strategy_ledgers_are_lower_case() {
        assert_eq!(
            strategy_ledger("DonationVotingMerkleDistributionDirectTransferStrategy"),
            "donationvotingmerkledistributiondirecttransferstrategy"
        );
    }
}
