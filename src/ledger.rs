use anyhow::{bail, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Ledger client interface
// ---------------------------------------------------------------------------

/// One telemetry sample submitted to the ledger. Serialized to canonical
/// JSON before digesting so the transaction id is a function of its content.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryPayload {
    pub node_id: i64,
    pub energy: f64,
    pub class: String,
    pub timestamp: f64,
}

/// Outcome of a submission: success flag plus an opaque transaction id.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub success: bool,
    pub tx_hash: String,
}

/// Network-level facts shown in the status panel.
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub network: String,
    pub chain_id: u64,
    pub latest_block: u64,
    pub gas_price_gwei: f64,
}

/// The surface a real ledger client would expose. The dashboard only ever
/// talks to this trait, so the simulated backend below could be swapped for
/// a real one without touching the UI.
pub trait LedgerClient {
    /// Establish a connection and report network facts.
    fn connect(&mut self) -> Result<ChainInfo>;

    /// Deploy the telemetry contract; returns its address.
    fn deploy_contract(&mut self, name: &str) -> Result<String>;

    /// Record one telemetry sample; requires a deployed contract.
    fn submit(&mut self, payload: &TelemetryPayload) -> Result<TxReceipt>;
}

// ---------------------------------------------------------------------------
// Simulated backend
// ---------------------------------------------------------------------------

/// A fake ledger. Produces well-formed but fabricated values: addresses and
/// transaction ids are local SHA-256 digests, the block counter just ticks.
/// Nothing leaves the process.
#[derive(Debug, Default)]
pub struct MockLedger {
    connected: bool,
    contract: Option<String>,
    nonce: u64,
    block: u64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract.as_deref()
    }

    fn digest(&self, material: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(material);
        hasher.update(self.nonce.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

impl LedgerClient for MockLedger {
    fn connect(&mut self) -> Result<ChainInfo> {
        self.connected = true;
        Ok(ChainInfo {
            network: "Simulated Devnet".to_string(),
            chain_id: 1337,
            latest_block: 8_245_720 + self.block,
            gas_price_gwei: 25.0,
        })
    }

    fn deploy_contract(&mut self, name: &str) -> Result<String> {
        if !self.connected {
            bail!("not connected to a ledger network");
        }
        self.nonce += 1;
        // Ethereum-style 20-byte address: last 40 hex chars of the digest.
        let digest = self.digest(name.as_bytes());
        let address = format!("0x{}", &digest[digest.len() - 40..]);
        self.contract = Some(address.clone());
        log::info!("deployed contract '{name}' at {address}");
        Ok(address)
    }

    fn submit(&mut self, payload: &TelemetryPayload) -> Result<TxReceipt> {
        if self.contract.is_none() {
            bail!("no contract deployed");
        }
        self.nonce += 1;
        self.block += 1;
        let body = serde_json::to_vec(payload)?;
        Ok(TxReceipt {
            success: true,
            tx_hash: format!("0x{}", self.digest(&body)),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TelemetryPayload {
        TelemetryPayload {
            node_id: 78,
            energy: 599.97,
            class: "Blackhole".to_string(),
            timestamp: 0.15,
        }
    }

    #[test]
    fn submit_requires_a_deployed_contract() {
        let mut ledger = MockLedger::new();
        assert!(ledger.submit(&payload()).is_err());

        ledger.connect().unwrap();
        assert!(ledger.submit(&payload()).is_err());

        ledger.deploy_contract("WsnTelemetry").unwrap();
        let receipt = ledger.submit(&payload()).unwrap();
        assert!(receipt.success);
    }

    #[test]
    fn deploy_requires_a_connection() {
        let mut ledger = MockLedger::new();
        assert!(ledger.deploy_contract("WsnTelemetry").is_err());
    }

    #[test]
    fn tx_hash_is_hex_and_unique_per_submission() {
        let mut ledger = MockLedger::new();
        ledger.connect().unwrap();
        ledger.deploy_contract("WsnTelemetry").unwrap();

        let a = ledger.submit(&payload()).unwrap();
        let b = ledger.submit(&payload()).unwrap();

        // 0x + 32-byte digest
        assert_eq!(a.tx_hash.len(), 66);
        assert!(a.tx_hash.starts_with("0x"));
        assert!(a.tx_hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
        // Same payload, different nonce: ids must not collide.
        assert_ne!(a.tx_hash, b.tx_hash);
    }

    #[test]
    fn contract_address_is_ethereum_shaped() {
        let mut ledger = MockLedger::new();
        ledger.connect().unwrap();
        let address = ledger.deploy_contract("WsnTelemetry").unwrap();
        assert_eq!(address.len(), 42);
        assert!(address.starts_with("0x"));
        assert_eq!(ledger.contract_address(), Some(address.as_str()));
    }
}
