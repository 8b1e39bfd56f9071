//! Signing of confidential compute records.
//!
//! The digest is `keccak256(0x42 || rlp([kettle, chainId, nonce, gasPrice,
//! gas, to, value, input]))`. The kettle address leads the payload, so a
//! signature made for one kettle recovers to a different signer when the
//! record is replayed against another.

use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256, U256};
use alloy::signers::Signature;
use alloy_rlp::Encodable;

use crate::blockchain::request::{ComputeRecord, ComputeRequest};
use crate::blockchain::types::{KettleError, KettleResult};
use crate::blockchain::wallet::Wallet;

/// Digest signed for a record.
pub fn signature_hash(record: &ComputeRecord) -> B256 {
    let mut buf = Vec::new();
    record.encode_typed(0, &mut buf, |_| {});
    keccak256(&buf)
}

/// Sign a request's record. The confidential inputs are not covered.
pub fn sign_request(request: &ComputeRequest, wallet: &Wallet) -> KettleResult<SignedEnvelope> {
    let hash = signature_hash(&request.record);
    let signature = wallet.sign_hash(&hash)?;

    tracing::debug!(
        signer = %wallet.address(),
        kettle = %request.record.kettle_address,
        nonce = request.record.nonce,
        "Signed compute record"
    );

    Ok(SignedEnvelope {
        record: request.record.clone(),
        signature,
    })
}

/// A signed record, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    record: ComputeRecord,
    signature: Signature,
}

impl SignedEnvelope {
    pub fn record(&self) -> &ComputeRecord {
        &self.record
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Canonical wire form: `0x42 || rlp([fields..., yParity, r, s])`.
    pub fn encoded(&self) -> Bytes {
        let y_parity = self.signature.v();
        let r: U256 = self.signature.r();
        let s: U256 = self.signature.s();
        let extra_len = y_parity.length() + r.length() + s.length();

        let mut buf = Vec::new();
        self.record.encode_typed(extra_len, &mut buf, |out| {
            y_parity.encode(out);
            r.encode(out);
            s.encode(out);
        });
        buf.into()
    }

    /// Transaction hash: keccak256 of the encoded envelope.
    pub fn hash(&self) -> TxHash {
        keccak256(self.encoded())
    }

    /// Recover the signer from this envelope's own record.
    pub fn recover_signer(&self) -> KettleResult<Address> {
        self.signature
            .recover_address_from_prehash(&signature_hash(&self.record))
            .map_err(|e| KettleError::Signing(alloy::signers::Error::other(e)))
    }

    /// Same signature over a record bound to another kettle.
    pub fn with_kettle_address(&self, kettle_address: Address) -> Self {
        let mut record = self.record.clone();
        record.kettle_address = kettle_address;
        Self {
            record,
            signature: self.signature,
        }
    }
}
