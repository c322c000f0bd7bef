//! Process-wide registry of known networks.
//!
//! The standard networks are pre-registered; applications add custom
//! networks with [`register`]. Consensus code never reads the registry —
//! parameters always travel explicitly through the chain context.

use crate::Params;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors from network registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A network with the same name is already registered.
    #[error("duplicate network name: {0}")]
    DuplicateNet(String),
}

static REGISTRY: OnceLock<RwLock<HashMap<String, Params>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Params>> {
    REGISTRY.get_or_init(|| {
        let mut networks = HashMap::new();
        for params in [
            Params::mainnet(),
            Params::testnet4(),
            Params::regtest(),
            Params::simnet(),
            Params::signet(),
        ] {
            networks.insert(params.name.clone(), params);
        }
        RwLock::new(networks)
    })
}

/// Register a network so callers can look it up by name.
///
/// Registering a name twice is rejected, including the standard networks.
pub fn register(params: Params) -> Result<(), RegistryError> {
    let mut networks = registry().write();
    if networks.contains_key(&params.name) {
        return Err(RegistryError::DuplicateNet(params.name));
    }
    networks.insert(params.name.clone(), params);
    Ok(())
}

/// Look up a registered network by name.
pub fn by_name(name: &str) -> Option<Params> {
    registry().read().get(name).cloned()
}

/// Whether a network with the given name has been registered.
pub fn is_registered(name: &str) -> bool {
    registry().read().contains_key(name)
}
