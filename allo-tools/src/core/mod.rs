// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

pub mod artifact;
pub mod chain;
pub mod config;
pub mod deployment;
pub mod identity;
pub mod ledger;
pub mod proxy;
pub mod validation;
pub mod version;
