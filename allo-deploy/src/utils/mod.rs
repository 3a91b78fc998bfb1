// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::fmt::Display;

use eyre::bail;

use style::{BOLD, ERROR};

mod style;

/// Converts a fee given in gwei, possibly fractional, to wei.
pub fn convert_gwei_to_wei(fee_str: &str) -> eyre::Result<u128> {
    let gwei = match fee_str.parse::<f64>() {
        Ok(fee) if fee >= 0.0 => fee,
        Ok(_) => bail!("fee per gas must be non-negative"),
        Err(_) => bail!("invalid fee per gas value: {}", fee_str),
    };
    if !gwei.is_finite() {
        bail!("invalid gwei value: must be finite");
    }

    let wei = gwei * 1e9;
    if !wei.is_finite() || wei >= u128::MAX as f64 {
        bail!("fee per gas of {fee_str} gwei is out of range");
    }
    Ok(wei as u128)
}

pub fn decode0x(text: impl AsRef<str>) -> eyre::Result<Vec<u8>> {
    let text = text.as_ref().trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(text)?)
}

pub fn print_error(err: impl Display) {
    eprintln!("{ERROR}error{ERROR:#}{BOLD}:{BOLD:#} {err}");
}
