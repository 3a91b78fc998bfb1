// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use crate::{
    core::ledger::{Ledger, LedgerStore},
    error::Result,
};

/// Renders a ledger as pretty JSON, limited to one chain if `chain_id` is given.
///
/// Missing ledgers render as `{}`, and a missing chain as `null`.
pub fn show<S: LedgerStore>(store: S, name: &str, chain_id: Option<u64>) -> Result<String> {
    let ledger = Ledger::read(store, name)?;
    let json = match chain_id {
        Some(chain_id) => serde_json::to_string_pretty(&ledger.get(chain_id))?,
        None => serde_json::to_string_pretty(ledger.entries())?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::MemoryStore;

    #[test]
    fn shows_whole_ledger_or_one_chain() {
        let store = MemoryStore::new();
        store.seed(
            "allo",
            r#"{"1":{"name":"Allo","proxy":"0x01"},"10":{"name":"Allo","proxy":"0x0a"}}"#,
        );

        let all: serde_json::Value =
            serde_json::from_str(&show(&store, "allo", None).unwrap()).unwrap();
        assert_eq!(all["10"]["proxy"], "0x0a");

        let one: serde_json::Value =
            serde_json::from_str(&show(&store, "allo", Some(1)).unwrap()).unwrap();
        assert_eq!(one["proxy"], "0x01");

        assert_eq!(show(&store, "allo", Some(5)).unwrap(), "null");
        assert_eq!(show(&store, "registry", None).unwrap(), "{}");
    }
}
