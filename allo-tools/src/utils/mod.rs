// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! General purpose utilities.

use std::{fs, path::Path};

use alloy::primitives::{utils::format_units, Address};
use color::{Color, GREY, MINT, YELLOW};

pub mod color;

/// Pretty-prints the gas used by a transaction.
pub fn format_gas(gas: u128) -> String {
    let text = format!("{gas} gas");
    if gas <= 3_000_000 {
        text.mint()
    } else if gas <= 7_000_000 {
        text.yellow()
    } else {
        text.pink()
    }
}

/// Pretty-prints a fee per gas in gwei.
pub fn format_gwei(wei: u128) -> String {
    match format_units(wei, "gwei") {
        Ok(gwei) => format!("{MINT}{gwei}{GREY} gwei"),
        Err(_) => format!("{YELLOW}{wei}{GREY} wei"),
    }
}

/// Parses an address stored as text, treating empty strings as missing.
pub fn parse_address(text: &str) -> Option<Address> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

/// Check if a directory exists, creating it (and its parents) if not.
pub fn create_dir_if_dne(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_rejects_blank() {
        assert_eq!(parse_address(""), None);
        assert_eq!(parse_address("   "), None);
        assert_eq!(parse_address("not an address"), None);
        assert_eq!(
            parse_address("0x000000000000000000000000000000000000dEaD"),
            Some(alloy::primitives::address!("000000000000000000000000000000000000dEaD"))
        );
    }
}
