//! Confidential compute request construction.
//!
//! A request is two parts: the public [`ComputeRecord`] that gets signed and
//! lands on chain, and the confidential inputs that only the kettle sees.

use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy_rlp::{BufMut, Encodable, Header};

use crate::blockchain::types::{KettleError, KettleResult};

/// Gas limit used for every request. Not estimated.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000;

/// Typed-transaction byte of a confidential compute record.
pub const COMPUTE_RECORD_TX_TYPE: u8 = 0x42;

/// The signed, public half of a confidential compute request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeRecord {
    /// Kettle that must execute the request.
    pub kettle_address: Address,
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: TxKind,
    pub value: U256,
    /// Encoded call data.
    pub input: Bytes,
}

impl ComputeRecord {
    fn fields_len(&self) -> usize {
        self.kettle_address.length()
            + self.chain_id.length()
            + self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.kettle_address.encode(out);
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    /// `type || rlp([fields..., extra...])`, the layout shared by the signing
    /// payload and the wire envelope.
    pub(crate) fn encode_typed(&self, extra_len: usize, out: &mut Vec<u8>, extra: impl FnOnce(&mut Vec<u8>)) {
        out.push(COMPUTE_RECORD_TX_TYPE);
        Header {
            list: true,
            payload_length: self.fields_len() + extra_len,
        }
        .encode(out);
        self.encode_fields(out);
        extra(out);
    }
}

/// A record paired with its confidential inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeRequest {
    pub record: ComputeRecord,
    /// Sent next to the envelope, never signed or stored on chain.
    pub confidential_inputs: Bytes,
}

/// Builder for [`ComputeRequest`].
///
/// Nonce and gas price are expected to be freshly queried right before
/// `build`; nothing re-validates them before signing.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    kettle_address: Address,
    chain_id: u64,
    to: Option<Address>,
    input: Bytes,
    confidential_inputs: Bytes,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    value: U256,
}

impl RequestBuilder {
    pub fn new(kettle_address: Address, chain_id: u64) -> Self {
        Self {
            kettle_address,
            chain_id,
            to: None,
            input: Bytes::new(),
            confidential_inputs: Bytes::new(),
            nonce: 0,
            gas_price: 0,
            gas_limit: DEFAULT_GAS_LIMIT,
            value: U256::ZERO,
        }
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn input(mut self, input: Bytes) -> Self {
        self.input = input;
        self
    }

    pub fn confidential_inputs(mut self, confidential_inputs: Bytes) -> Self {
        self.confidential_inputs = confidential_inputs;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Assemble the request.
    ///
    /// Contract creation is not supported: a missing or zero destination is
    /// rejected, as is a zero kettle address.
    pub fn build(self) -> KettleResult<ComputeRequest> {
        let to = match self.to {
            None => {
                return Err(KettleError::InvalidRequest("missing destination".to_string()));
            }
            Some(to) if to.is_zero() => {
                return Err(KettleError::InvalidRequest("zero destination".to_string()));
            }
            Some(to) => to,
        };
        if self.kettle_address.is_zero() {
            return Err(KettleError::InvalidRequest("zero kettle address".to_string()));
        }

        Ok(ComputeRequest {
            record: ComputeRecord {
                kettle_address: self.kettle_address,
                chain_id: self.chain_id,
                nonce: self.nonce,
                gas_price: self.gas_price,
                gas_limit: self.gas_limit,
                to: TxKind::Call(to),
                value: self.value,
                input: self.input,
            },
            confidential_inputs: self.confidential_inputs,
        })
    }
}
