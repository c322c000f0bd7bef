//! # dorian-chaincfg
//!
//! Consensus parameters for the Doriancoin networks.
//!
//! This crate provides:
//! - The difficulty-relevant parameter set for each standard network
//!   (mainnet, testnet4, regtest, simnet, signet)
//! - A config loader for custom networks
//! - A process-wide registry of known networks
//!
//! Parameters are immutable after construction. Consensus code receives
//! them explicitly; nothing in this crate is consulted implicitly during
//! validation.

mod config;
mod params;
mod registry;

pub use config::{ChainParamsError, ParamsConfig};
pub use params::Params;
pub use registry::{by_name, is_registered, register, RegistryError};
