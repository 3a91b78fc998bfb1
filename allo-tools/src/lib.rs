// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Tools for deploying and maintaining Allo contracts across chains.

#[macro_use]
mod macros;

pub mod core;
pub(crate) mod error;
pub mod ops;

pub mod utils;

pub mod verifier;
pub use verifier::*;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod test_utils;
