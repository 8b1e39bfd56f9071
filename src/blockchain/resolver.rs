//! Kettle address and signing key resolution.
//!
//! Both run once per session, before any request is built.

use alloy::primitives::{address, Address};

use crate::blockchain::client::KettleRpc;
use crate::blockchain::types::{KettleError, KettleResult};
use crate::blockchain::wallet::Wallet;

/// Kettle address of a local development node.
pub const DEV_KETTLE_ADDRESS: Address = address!("b5feafbdd752ad52afb7e1bd2e40432a485bbb7f");

/// Funded, publicly documented key of the local development node. Not a secret.
pub const DEV_PRIVATE_KEY: &str = "91ab9a7e53c220e6210460b65a7a3bb2ca181412a8a7b43ff336b3df1737ce12";

/// A fallback key that only applies to one specific kettle.
#[derive(Debug, Clone)]
pub struct DevModeKey {
    kettle_address: Address,
    wallet: Wallet,
}

impl DevModeKey {
    pub fn new(kettle_address: Address, wallet: Wallet) -> Self {
        Self {
            kettle_address,
            wallet,
        }
    }

    /// The local development node's kettle and key.
    pub fn well_known() -> KettleResult<Self> {
        Ok(Self::new(DEV_KETTLE_ADDRESS, Wallet::from_private_key(DEV_PRIVATE_KEY)?))
    }

    pub fn kettle_address(&self) -> Address {
        self.kettle_address
    }
}

/// Resolve the kettle to target.
///
/// An explicit address is returned as-is without contacting the endpoint.
/// Otherwise the first address advertised by the endpoint is used.
pub async fn resolve_kettle<R>(rpc: &R, explicit: Option<Address>) -> KettleResult<Address>
where
    R: KettleRpc + ?Sized,
{
    if let Some(address) = explicit {
        tracing::debug!(kettle = %address, "Using configured kettle");
        return Ok(address);
    }

    let addresses = rpc.kettle_addresses().await?;
    let kettle = addresses.first().copied().ok_or(KettleError::NoKettleFound)?;

    tracing::info!(kettle = %kettle, advertised = addresses.len(), "Discovered kettle");
    Ok(kettle)
}

/// Resolve the session's signing key.
///
/// An explicit key always wins. Without one, `dev_key` is used only when
/// `kettle` is exactly its kettle address.
pub fn resolve_key(
    explicit_hex: Option<&str>,
    kettle: Address,
    dev_key: Option<&DevModeKey>,
) -> KettleResult<Wallet> {
    if let Some(key) = explicit_hex {
        return Wallet::from_private_key(key);
    }

    match dev_key {
        Some(dev) if dev.kettle_address == kettle => {
            tracing::warn!(kettle = %kettle, "Using development key for development kettle");
            Ok(dev.wallet.clone())
        }
        _ => Err(KettleError::NoKeyConfigured(kettle)),
    }
}
